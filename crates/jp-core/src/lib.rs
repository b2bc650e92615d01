pub mod config;
pub mod error;
pub mod logging;

// Batch download pipeline
pub mod fetcher;
pub mod history;
pub mod media;
pub mod orchestrator;
pub mod paths;
pub mod progress;
pub mod server;
