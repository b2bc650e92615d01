//! Fetcher adapter: the boundary around the external download/convert tool.
//!
//! A fetch either yields a `FetchedFile` that exists on disk or a typed
//! `JobError`; progress is reported through the supplied `ProgressSink`.

mod parse;
mod resolve;
mod ytdlp;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::JobError;
use crate::media::MediaFormat;
use crate::progress::ProgressSink;

pub use parse::{parse_line, ToolLine, ToolPhase, FILE_MARKER, PROGRESS_MARKER, TITLE_MARKER};
pub use resolve::resolve_output;
pub use ytdlp::YtDlpFetcher;

/// One URL to fetch, with the batch's shared format/quality/destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub format: MediaFormat,
    pub quality: Option<String>,
    pub dest_dir: PathBuf,
}

/// A completed download that has been verified to exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: PathBuf,
    pub title: String,
    pub size_bytes: u64,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest, sink: &ProgressSink)
        -> Result<FetchedFile, JobError>;
}
