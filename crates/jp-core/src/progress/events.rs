use serde_json::{json, Value};
use std::path::PathBuf;

use crate::orchestrator::JobId;

/// Byte counters as the download tool renders them (display strings, not numbers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    pub percent: String,
    pub speed: String,
    pub eta: String,
    pub downloaded: String,
    pub total: String,
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self {
            percent: "0%".to_string(),
            speed: "N/A".to_string(),
            eta: "N/A".to_string(),
            downloaded: "0B".to_string(),
            total: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressKind {
    Downloading(DownloadProgress),
    /// Download finished; merge/convert still running.
    Processing,
    Error { message: String },
    Complete { title: String, path: PathBuf },
}

/// One progress update, always tagged with the job it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub download_id: JobId,
    pub kind: ProgressKind,
}

impl ProgressEvent {
    pub fn new(download_id: JobId, kind: ProgressKind) -> Self {
        Self { download_id, kind }
    }

    /// Complete and Error are the last event a job publishes.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            ProgressKind::Error { .. } | ProgressKind::Complete { .. }
        )
    }

    /// Event name on the push channel.
    pub fn wire_name(&self) -> &'static str {
        match self.kind {
            ProgressKind::Downloading(_) | ProgressKind::Processing => "download_progress",
            ProgressKind::Error { .. } => "download_error",
            ProgressKind::Complete { .. } => "download_complete",
        }
    }

    /// `{"event": <name>, "data": {...}}` frame for the push channel.
    pub fn to_wire(&self) -> Value {
        let id = self.download_id.as_str();
        let data = match &self.kind {
            ProgressKind::Downloading(p) => json!({
                "download_id": id,
                "percent": p.percent,
                "speed": p.speed,
                "eta": p.eta,
                "downloaded": p.downloaded,
                "total": p.total,
                "status": "Downloading",
            }),
            ProgressKind::Processing => json!({
                "download_id": id,
                "percent": "100%",
                "status": "Processing...",
            }),
            ProgressKind::Error { message } => json!({
                "download_id": id,
                "error": message,
            }),
            ProgressKind::Complete { title, path } => json!({
                "download_id": id,
                "title": title,
                "path": path.display().to_string(),
            }),
        };
        json!({ "event": self.wire_name(), "data": data })
    }
}
