//! `Fetcher` backed by a yt-dlp child process.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::parse::{parse_line, progress_template, ToolLine, ToolPhase, FILE_MARKER, TITLE_MARKER};
use super::resolve::resolve_output;
use super::{FetchRequest, FetchedFile, Fetcher};
use crate::error::JobError;
use crate::media::{MediaKind, Strategy};
use crate::progress::ProgressSink;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";

/// Runs one yt-dlp process per fetch.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: PathBuf,
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlpFetcher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Full argument list for one request (without the program name).
    pub fn build_args(request: &FetchRequest) -> Vec<String> {
        let output_template = request.dest_dir.join("%(title)s.%(ext)s");
        let mut args: Vec<String> = vec![
            "--newline".into(),
            "--no-colors".into(),
            "--no-playlist".into(),
            "--no-check-certificates".into(),
            "--add-header".into(),
            format!("User-Agent:{}", USER_AGENT),
            "--retries".into(),
            "10".into(),
            "--fragment-retries".into(),
            "10".into(),
            "--continue".into(),
            "--no-simulate".into(),
            "--progress-template".into(),
            progress_template(),
            "-o".into(),
            output_template.display().to_string(),
        ];

        args.extend(Strategy::for_format(request.format).args(request.quality.as_deref()));

        // Title is known right after extraction; the final path only once
        // post-processors (merge, convert, move) have run.
        args.push("--print".into());
        args.push(format!("video:{}%(title)s", TITLE_MARKER));
        args.push("--print".into());
        let path_field = match request.format.kind() {
            MediaKind::Image => "%(thumbnails.-1.filepath)s",
            MediaKind::Video | MediaKind::Audio => "%(filepath)s",
        };
        args.push(format!("after_move:{}{}", FILE_MARKER, path_field));

        args.push("--".into());
        args.push(request.url.clone());
        args
    }
}

/// Keeps the last `ERROR:` line written to stderr.
async fn drain_stderr(stderr: tokio::process::ChildStderr) -> Option<String> {
    let mut lines = BufReader::new(stderr).lines();
    let mut last_error = None;
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_line(&line) {
            ToolLine::Error(msg) => last_error = Some(msg),
            _ => tracing::trace!(target: "jp_core::fetcher::ytdlp", "stderr> {}", line),
        }
    }
    last_error
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        sink: &ProgressSink,
    ) -> Result<FetchedFile, JobError> {
        let args = Self::build_args(request);
        tracing::debug!(job_id = %sink.job_id(), url = %request.url, "spawning {}", self.program.display());

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                JobError::FetchFailed(format!("could not start {}: {}", self.program.display(), e))
            })?;

        let stderr_task = child.stderr.take().map(|s| tokio::spawn(drain_stderr(s)));
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| JobError::FetchFailed("downloader stdout unavailable".into()))?;

        let mut title: Option<String> = None;
        let mut reported: Option<PathBuf> = None;
        let mut last_error: Option<String> = None;
        let mut lines = BufReader::new(stdout).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(job_id = %sink.job_id(), "reading downloader output: {}", e);
                    break;
                }
            };
            match parse_line(&line) {
                ToolLine::Progress(ToolPhase::Downloading(p)) => sink.downloading(p),
                ToolLine::Progress(ToolPhase::Finished) => sink.processing(),
                // The terminal error event is published once the job settles.
                ToolLine::Progress(ToolPhase::Error) => {
                    tracing::debug!(job_id = %sink.job_id(), "downloader reported an error phase")
                }
                ToolLine::Title(t) => title = Some(t),
                ToolLine::FilePath(p) => reported = Some(p),
                ToolLine::Error(msg) => last_error = Some(msg),
                ToolLine::Other => {}
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| JobError::FetchFailed(format!("waiting for downloader: {}", e)))?;
        if let Some(task) = stderr_task {
            if let Ok(Some(msg)) = task.await {
                last_error = Some(msg);
            }
        }

        if !status.success() {
            return Err(JobError::FetchFailed(
                last_error.unwrap_or_else(|| format!("downloader exited with {}", status)),
            ));
        }

        let path = resolve_output(
            reported.as_deref(),
            &request.dest_dir,
            title.as_deref(),
            request.format,
        )
        .await?;
        let size_bytes = file_size(&path).await?;

        Ok(FetchedFile {
            path,
            title: title.unwrap_or_else(|| "Unknown".to_string()),
            size_bytes,
        })
    }
}

async fn file_size(path: &Path) -> Result<u64, JobError> {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.len())
        .map_err(|_| JobError::FileNotFound(path.display().to_string()))
}
