//! Job storage trait and types.

use std::collections::HashMap;
use thiserror::Error;

use crate::orchestrator::JobStatus;

use super::types::{DownloadJob, JobUpdate, NewJob};

/// Error type for job store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobStoreError {
    #[error("Download job not found: {0}")]
    NotFound(String),

    /// The job already finished; its record is frozen.
    #[error("Download job {id} is already {status}")]
    Terminal { id: String, status: JobStatus },

    #[error("Download job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },

    /// The job is still running and cannot be removed.
    #[error("Download job {id} is still {status}")]
    Active { id: String, status: JobStatus },
}

/// Filter for listing jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Only jobs in this status.
    pub status: Option<JobStatus>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn matches(&self, job: &DownloadJob) -> bool {
        self.status.map_or(true, |status| job.status == status)
    }
}

/// Trait for job registries.
///
/// Implementations must tolerate concurrent create, update and read from
/// many jobs at once.
pub trait JobStore: Send + Sync {
    /// Register a new job in `starting` state and return its snapshot.
    fn create(&self, job: NewJob) -> DownloadJob;

    /// Get a snapshot of a job by ID.
    fn get(&self, id: &str) -> Option<DownloadJob>;

    /// Apply an update and return the new snapshot.
    fn update(&self, id: &str, update: JobUpdate) -> Result<DownloadJob, JobStoreError>;

    /// List jobs matching the filter, oldest first.
    fn list(&self, filter: &JobFilter) -> Vec<DownloadJob>;

    /// Remove a finished job and return its last snapshot.
    fn remove(&self, id: &str) -> Result<DownloadJob, JobStoreError>;

    /// Number of jobs in each status. Statuses with no jobs map to 0.
    fn count_by_status(&self) -> HashMap<JobStatus, usize> {
        let mut counts: HashMap<JobStatus, usize> =
            JobStatus::all().into_iter().map(|s| (s, 0)).collect();
        for job in self.list(&JobFilter::new()) {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        counts
    }
}
