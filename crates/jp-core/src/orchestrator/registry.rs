//! Registry of live jobs: id -> state.
//!
//! Every job registers when it is created and unregisters when its unit of
//! work ends (the returned guard does this on drop). A second registration of
//! a live id is refused: ids are supposed to be unique, so a clash is a bug.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::job::{JobId, JobState};

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobState>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending job. Returns None if the id is already live.
    pub fn register(self: &Arc<Self>, job_id: &JobId) -> Option<RegistrationGuard> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        if jobs.contains_key(job_id) {
            return None;
        }
        jobs.insert(job_id.clone(), JobState::Pending);
        Some(RegistrationGuard {
            registry: Arc::clone(self),
            job_id: job_id.clone(),
        })
    }

    pub fn state(&self, job_id: &JobId) -> Option<JobState> {
        self.jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(job_id)
            .copied()
    }

    /// Snapshot of every live job.
    pub fn snapshot(&self) -> Vec<(JobId, JobState)> {
        self.jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(id, state)| (id.clone(), *state))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_state(&self, job_id: &JobId, state: JobState) {
        if let Some(s) = self
            .jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(job_id)
        {
            *s = state;
        }
    }

    fn unregister(&self, job_id: &JobId) {
        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(job_id);
    }
}

/// Held by a job's unit of work; unregisters the job when dropped.
#[derive(Debug)]
pub struct RegistrationGuard {
    registry: Arc<JobRegistry>,
    job_id: JobId,
}

impl RegistrationGuard {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn set_state(&self, state: JobState) {
        tracing::trace!(job_id = %self.job_id, state = state.as_str(), "job state");
        self.registry.set_state(&self.job_id, state);
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.registry.unregister(&self.job_id);
    }
}
