//! Types stored in and read from the history table.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// History row identifier.
pub type RecordId = i64;

/// Status column value; only completed downloads are recorded.
pub const STATUS_COMPLETED: &str = "completed";

/// Fields supplied when a successful job is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    pub url: String,
    pub title: String,
    pub file_format: String,
    pub quality: Option<String>,
    /// Display size, e.g. "12.34 MB".
    pub file_size: String,
    pub download_path: String,
}

/// One stored history row, serialized as-is by `GET /history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub id: RecordId,
    pub url: String,
    pub title: Option<String>,
    pub file_format: String,
    pub quality: Option<String>,
    pub file_size: Option<String>,
    pub download_path: Option<String>,
    /// UTC, ISO-8601 with a trailing `Z`.
    pub timestamp: String,
    pub status: String,
}

/// Render a millisecond Unix timestamp the way the history API reports it.
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}
