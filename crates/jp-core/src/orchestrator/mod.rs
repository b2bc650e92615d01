//! Job orchestrator: one batch request fans out into one task per URL,
//! waits for every task, then packages the results.
//!
//! Pipeline per batch: resolve destination -> spawn jobs -> join all ->
//! packaging decision -> (optional) archive.

mod destination;
mod job;
mod package;
mod registry;
mod run;


use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::{BatchError, JobError};
use crate::fetcher::{FetchRequest, Fetcher};
use crate::history::HistoryStore;
use crate::media::MediaFormat;
use crate::progress::ProgressBroadcaster;

pub use destination::{resolve as resolve_destination, Destination, ResolvedDestination, TEMP_DIR_PREFIX};
pub use job::{format_size_mb, JobFailure, JobId, JobOutcome, JobState, JobSuccess};
pub use package::{archive_member_name, build_archive, unique_member_names, Packaging, PackagingKind};
pub use registry::{JobRegistry, RegistrationGuard};

use run::{run_job, JobContext, JobInput};

type SpawnedJob = (usize, String, JobId, JoinHandle<JobOutcome>);

/// Production hardening knobs. Both default to off: unbounded fan-out, no deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorLimits {
    pub max_concurrent_jobs: Option<usize>,
    pub job_timeout: Option<Duration>,
}

/// One download request: N URLs sharing format, quality and destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub urls: Vec<String>,
    pub format: MediaFormat,
    pub quality: Option<String>,
    pub destination: Destination,
}

/// Settled batch: every submitted URL appears exactly once in `succeeded` or `failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Sorted by original index.
    pub succeeded: Vec<JobSuccess>,
    /// Sorted by original index.
    pub failed: Vec<JobFailure>,
    pub output_dir: PathBuf,
    pub is_temp: bool,
    pub packaging: Packaging,
}

impl BatchResult {
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

pub struct Orchestrator {
    fetcher: Arc<dyn Fetcher>,
    history: Arc<dyn HistoryStore>,
    progress: ProgressBroadcaster,
    limits: OrchestratorLimits,
    registry: Arc<JobRegistry>,
    temp_root: Option<PathBuf>,
    job_ids: fn(usize) -> JobId,
}

impl Orchestrator {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        history: Arc<dyn HistoryStore>,
        progress: ProgressBroadcaster,
        limits: OrchestratorLimits,
    ) -> Self {
        Self {
            fetcher,
            history,
            progress,
            limits,
            registry: Arc::new(JobRegistry::new()),
            temp_root: None,
            job_ids: JobId::generate,
        }
    }

    /// Create temporary batch directories under `root` instead of the system temp dir.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Replace id generation (lets tests force id collisions).
    #[cfg(test)]
    pub(crate) fn with_job_ids(mut self, job_ids: fn(usize) -> JobId) -> Self {
        self.job_ids = job_ids;
        self
    }

    pub fn progress(&self) -> &ProgressBroadcaster {
        &self.progress
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Jobs currently running (or waiting for a permit) across all batches.
    pub fn live_jobs(&self) -> Vec<(JobId, JobState)> {
        self.registry.snapshot()
    }

    /// Run a batch to completion. Returns only after every job reached a
    /// terminal state; individual job failures are part of the result.
    pub async fn submit(&self, request: BatchRequest) -> Result<BatchResult, BatchError> {
        if request.urls.is_empty() {
            return Err(BatchError::InvalidRequest("no urls given".into()));
        }

        let dest = resolve_destination(&request.destination, self.temp_root.as_deref())?;
        tracing::info!(
            jobs = request.urls.len(),
            format = %request.format,
            dir = %dest.dir.display(),
            is_temp = dest.is_temp,
            "batch started"
        );

        let ctx = JobContext {
            fetcher: Arc::clone(&self.fetcher),
            history: Arc::clone(&self.history),
            progress: self.progress.clone(),
            permits: self
                .limits
                .max_concurrent_jobs
                .map(|n| Arc::new(Semaphore::new(n.max(1)))),
            timeout: self.limits.job_timeout,
        };

        let mut handles = Vec::with_capacity(request.urls.len());
        for (index, url) in request.urls.iter().enumerate() {
            let job_id = (self.job_ids)(index);
            let Some(guard) = self.registry.register(&job_id) else {
                tracing::error!(job_id = %job_id, "job id collision");
                // Jobs already spawned still settle before the batch reports the error.
                let (succeeded, failed) = self.settle(handles).await;
                tracing::warn!(
                    succeeded = succeeded.len(),
                    failed = failed.len(),
                    "batch aborted after id collision"
                );
                return Err(BatchError::DuplicateJobId(job_id.to_string()));
            };
            let input = JobInput {
                index,
                url: url.clone(),
                job_id: job_id.clone(),
                request: FetchRequest {
                    url: url.clone(),
                    format: request.format,
                    quality: request.quality.clone(),
                    dest_dir: dest.dir.clone(),
                },
                guard,
            };
            let handle = tokio::spawn(run_job(ctx.clone(), input));
            handles.push((index, url.clone(), job_id, handle));
        }

        let (succeeded, failed) = self.settle(handles).await;

        let packaging = self.package(&dest.dir, dest.is_temp, &succeeded, request.format).await?;
        tracing::info!(
            succeeded = succeeded.len(),
            failed = failed.len(),
            packaging = packaging.kind_str().unwrap_or("none"),
            "batch finished"
        );

        Ok(BatchResult {
            succeeded,
            failed,
            output_dir: dest.dir,
            is_temp: dest.is_temp,
            packaging,
        })
    }

    /// Full barrier: awaits every handle in submission order, none short-circuits
    /// the others. A task that panicked or was cancelled becomes a failed job and
    /// still gets its terminal `Error` event.
    async fn settle(&self, handles: Vec<SpawnedJob>) -> (Vec<JobSuccess>, Vec<JobFailure>) {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (index, url, job_id, handle) in handles {
            match handle.await {
                Ok(JobOutcome::Succeeded(s)) => succeeded.push(s),
                Ok(JobOutcome::Failed(f)) => failed.push(f),
                Err(e) => {
                    let error = JobError::FetchFailed(format!("job task ended abnormally: {}", e));
                    tracing::error!(job_id = %job_id, url = %url, "{}", error);
                    self.progress.sink(job_id.clone()).error(error.to_string());
                    failed.push(JobFailure {
                        index,
                        job_id,
                        url,
                        error,
                    });
                }
            }
        }
        (succeeded, failed)
    }

    async fn package(
        &self,
        dir: &Path,
        is_temp: bool,
        succeeded: &[JobSuccess],
        format: MediaFormat,
    ) -> Result<Packaging, BatchError> {
        Ok(match Packaging::decide(is_temp, succeeded.len()) {
            PackagingKind::None => Packaging::None,
            PackagingKind::SingleFile => Packaging::SingleFile(succeeded[0].path.clone()),
            PackagingKind::Archive => Packaging::Archive(build_archive(dir, succeeded, format).await?),
        })
    }
}
