//! CLI command handlers, one file per command family.

mod history;
mod serve;
mod validate_path;

pub use history::{open_history, run_clear_history, run_delete_history, run_history};
pub use serve::run_serve;
pub use validate_path::run_validate_path;
