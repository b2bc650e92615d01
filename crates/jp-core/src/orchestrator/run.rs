//! One job's unit of work: fetch, record history, publish the terminal event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::job::{format_size_mb, JobFailure, JobId, JobOutcome, JobState, JobSuccess};
use super::registry::RegistrationGuard;
use crate::error::JobError;
use crate::fetcher::{FetchRequest, FetchedFile, Fetcher};
use crate::history::{HistoryStore, NewHistoryRecord};
use crate::media::MediaFormat;
use crate::progress::{ProgressBroadcaster, ProgressKind};

/// Everything a unit of work needs, shared by all jobs of a batch.
#[derive(Clone)]
pub(super) struct JobContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub history: Arc<dyn HistoryStore>,
    pub progress: ProgressBroadcaster,
    pub permits: Option<Arc<Semaphore>>,
    pub timeout: Option<Duration>,
}

pub(super) struct JobInput {
    pub index: usize,
    pub url: String,
    pub job_id: JobId,
    pub request: FetchRequest,
    pub guard: RegistrationGuard,
}

/// Runs one job to a terminal state. Never returns an error: a failed fetch
/// is an outcome, and a failed history write is only logged.
pub(super) async fn run_job(ctx: JobContext, input: JobInput) -> JobOutcome {
    let JobInput {
        index,
        url,
        job_id,
        request,
        guard,
    } = input;

    // Waiting for a permit still counts as pending.
    let _permit = match &ctx.permits {
        Some(sem) => Arc::clone(sem).acquire_owned().await.ok(),
        None => None,
    };
    guard.set_state(JobState::Running);

    let sink = ctx.progress.sink(job_id.clone());
    let fetched = match ctx.timeout {
        Some(limit) => match tokio::time::timeout(limit, ctx.fetcher.fetch(&request, &sink)).await {
            Ok(res) => res,
            Err(_) => Err(JobError::FetchFailed(format!(
                "timed out after {}s",
                limit.as_secs()
            ))),
        },
        None => ctx.fetcher.fetch(&request, &sink).await,
    };

    let fetched = match fetched {
        Ok(file) => verify_on_disk(file).await,
        Err(e) => Err(e),
    };

    let outcome = match fetched {
        Ok(file) => JobOutcome::Succeeded(JobSuccess {
            index,
            job_id: job_id.clone(),
            url,
            title: file.title,
            path: file.path,
            size_bytes: file.size_bytes,
        }),
        Err(error) => JobOutcome::Failed(JobFailure {
            index,
            job_id: job_id.clone(),
            url,
            error,
        }),
    };
    guard.set_state(outcome.state());

    // The outcome is fixed before history is touched.
    match &outcome {
        JobOutcome::Succeeded(s) => {
            record_history(ctx.history.as_ref(), s, request.format, request.quality.as_deref())
                .await;
            tracing::info!(job_id = %job_id, url = %s.url, path = %s.path.display(), "job succeeded");
            sink.emit(ProgressKind::Complete {
                title: s.title.clone(),
                path: s.path.clone(),
            });
        }
        JobOutcome::Failed(f) => {
            tracing::error!(job_id = %job_id, url = %f.url, "download failed: {}", f.error);
            sink.error(f.error.to_string());
        }
    }

    outcome
}

/// A fetch that claims success must have left a regular file behind.
async fn verify_on_disk(file: FetchedFile) -> Result<FetchedFile, JobError> {
    match tokio::fs::metadata(&file.path).await {
        Ok(meta) if meta.is_file() => Ok(file),
        _ => Err(JobError::FileNotFound(file.path.display().to_string())),
    }
}

/// Append a history row; failures are logged and otherwise ignored.
async fn record_history(
    history: &dyn HistoryStore,
    success: &JobSuccess,
    format: MediaFormat,
    quality: Option<&str>,
) {
    let record = NewHistoryRecord {
        url: success.url.clone(),
        title: success.title.clone(),
        file_format: format.as_str().to_string(),
        quality: quality.map(str::to_string),
        file_size: format_size_mb(success.size_bytes),
        download_path: success.path.display().to_string(),
    };
    if let Err(e) = history.append(&record).await {
        tracing::warn!(
            job_id = %success.job_id,
            url = %success.url,
            "history persist failed (download kept): {}",
            e
        );
    }
}
