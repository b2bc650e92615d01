//! Error taxonomy for jobs, batches, and the history store.
//!
//! Per-job failures (`JobError`) are data: they end up in a batch's failure
//! list and never abort the batch. `BatchError` is what `Orchestrator::submit`
//! itself returns when there is nothing coherent to hand back.

use thiserror::Error;

/// Failure of a single job (one URL). Reported in the batch result, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Requested format is not one of mp4, mp3, wav, jpg, png.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// The download tool failed (extractor, network, or post-processing error).
    #[error("{0}")]
    FetchFailed(String),
    /// The tool reported success but the expected output is not on disk.
    #[error("file not found after download: {0}")]
    FileNotFound(String),
}

/// Failure of the batch call as a whole.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Missing or malformed batch fields (no URLs, no format).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Could not create the temporary destination directory.
    #[error("could not prepare destination: {0}")]
    DestinationFailed(#[source] std::io::Error),
    /// Two live jobs were handed the same id.
    #[error("duplicate job id: {0}")]
    DuplicateJobId(String),
    /// Building the zip archive failed; no partial archive is returned.
    #[error("archive build failed: {0}")]
    ArchiveBuildFailed(#[from] ArchiveError),
}

/// Archive construction failure (a member vanished, disk full, zip write error).
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive task: {0}")]
    Join(String),
}

/// History store failure. Logged by the orchestrator, never propagated into job outcomes.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history store: {0}")]
    Store(#[from] sqlx::Error),
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}
