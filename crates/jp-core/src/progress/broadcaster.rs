use tokio::sync::broadcast;

use super::events::{DownloadProgress, ProgressEvent, ProgressKind};
use crate::orchestrator::JobId;

/// Best-effort fan-out of progress events to any number of observers.
///
/// `publish` never blocks and never fails the producer: with no subscriber the
/// event is dropped, and a subscriber that falls more than `capacity` events
/// behind skips ahead. Each job has a single producer and the channel is FIFO,
/// so events for one job id reach every observer in the order produced.
#[derive(Debug, Clone)]
pub struct ProgressBroadcaster {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("progress event dropped: no observers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Per-job handle that stamps every event with `job_id`.
    pub fn sink(&self, job_id: JobId) -> ProgressSink {
        ProgressSink {
            job_id,
            hub: self.clone(),
        }
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// What a fetcher holds while it runs: publishes events for exactly one job.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    job_id: JobId,
    hub: ProgressBroadcaster,
}

impl ProgressSink {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn emit(&self, kind: ProgressKind) {
        self.hub
            .publish(ProgressEvent::new(self.job_id.clone(), kind));
    }

    pub fn downloading(&self, progress: DownloadProgress) {
        self.emit(ProgressKind::Downloading(progress));
    }

    pub fn processing(&self) {
        self.emit(ProgressKind::Processing);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(ProgressKind::Error {
            message: message.into(),
        });
    }
}
