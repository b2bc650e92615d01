//! Fetcher that never leaves the machine: writes a small file named after the URL.

use std::collections::HashSet;

use async_trait::async_trait;
use jp_core::error::JobError;
use jp_core::fetcher::{FetchRequest, FetchedFile, Fetcher};
use jp_core::progress::{DownloadProgress, ProgressSink};

#[derive(Debug, Default)]
pub struct LocalFetcher {
    failing: HashSet<String>,
}

impl LocalFetcher {
    /// URLs in `failing` fail the way an unsupported site does.
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
        }
    }
}

/// Title derived from a URL: its last path segment.
pub fn title_of(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("clip")
        .to_string()
}

#[async_trait]
impl Fetcher for LocalFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        sink: &ProgressSink,
    ) -> Result<FetchedFile, JobError> {
        sink.downloading(DownloadProgress {
            percent: "10.0%".into(),
            ..DownloadProgress::default()
        });
        if self.failing.contains(&request.url) {
            return Err(JobError::FetchFailed(format!(
                "ERROR: Unsupported URL: {}",
                request.url
            )));
        }
        let title = title_of(&request.url);
        let body = format!("media bytes for {}", request.url);
        let path = request
            .dest_dir
            .join(format!("{}.{}", title, request.format.extension()));
        tokio::fs::write(&path, body.as_bytes())
            .await
            .map_err(|e| JobError::FetchFailed(e.to_string()))?;
        sink.processing();
        Ok(FetchedFile {
            path,
            title,
            size_bytes: body.len() as u64,
        })
    }
}
