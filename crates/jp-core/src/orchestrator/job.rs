//! Job identity and per-job outcomes.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::JobError;

static NEXT_JOB_SEQ: AtomicU64 = AtomicU64::new(1);

/// Opaque job identifier, unique within the process lifetime.
///
/// Shape: `download_<index>_<secs>.<micros>_<seq>`. The sequence number makes
/// ids unique even when the clock does not advance between two jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(Arc<str>);

impl JobId {
    pub fn generate(index: usize) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let seq = NEXT_JOB_SEQ.fetch_add(1, Ordering::Relaxed);
        JobId(
            format!(
                "download_{}_{}.{:06}_{}",
                index,
                now.as_secs(),
                now.subsec_micros(),
                seq
            )
            .into(),
        )
    }

    /// Wrap an existing id (tests, ids echoed back by clients).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        JobId(raw.into().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of one job: Pending -> Running -> {Succeeded, Failed}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSuccess {
    /// Position of the URL in the submitted batch.
    pub index: usize,
    pub job_id: JobId,
    pub url: String,
    pub title: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl JobSuccess {
    pub fn size_display(&self) -> String {
        format_size_mb(self.size_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub index: usize,
    pub job_id: JobId,
    pub url: String,
    pub error: JobError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded(JobSuccess),
    Failed(JobFailure),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Succeeded(_) => JobState::Succeeded,
            JobOutcome::Failed(_) => JobState::Failed,
        }
    }
}

/// Size as shown to users and stored in history, e.g. "12.34 MB".
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
