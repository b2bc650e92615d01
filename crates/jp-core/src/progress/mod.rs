//! Real-time progress fan-out keyed by job id.
//!
//! Producers (one per job) publish into a broadcast hub; observers such as
//! WebSocket connections subscribe independently of any job's lifecycle.

mod broadcaster;
mod events;

pub use broadcaster::{ProgressBroadcaster, ProgressSink};
pub use events::{DownloadProgress, ProgressEvent, ProgressKind};
