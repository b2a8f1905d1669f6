//! In-memory job store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use super::store::{JobFilter, JobStore, JobStoreError};
use super::types::{DownloadJob, JobUpdate, NewJob};

#[derive(Debug, Default)]
struct Entries {
    /// Insertion counter, breaks ties between jobs created in the same instant.
    next_seq: u64,
    jobs: HashMap<String, (u64, DownloadJob)>,
}

/// Job registry kept in process memory.
///
/// Records live until explicitly removed.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    entries: RwLock<Entries>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JobStore for InMemoryJobStore {
    fn create(&self, job: NewJob) -> DownloadJob {
        let id = Uuid::new_v4().to_string();
        let record = DownloadJob::new(id.clone(), job, Utc::now());

        let mut entries = self.write();
        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.jobs.insert(id, (seq, record.clone()));
        record
    }

    fn get(&self, id: &str) -> Option<DownloadJob> {
        self.read().jobs.get(id).map(|(_, job)| job.clone())
    }

    fn update(&self, id: &str, update: JobUpdate) -> Result<DownloadJob, JobStoreError> {
        let mut entries = self.write();
        let (_, job) = entries
            .jobs
            .get_mut(id)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        job.apply(update, Utc::now())?;
        Ok(job.clone())
    }

    fn list(&self, filter: &JobFilter) -> Vec<DownloadJob> {
        let entries = self.read();
        let mut matching: Vec<&(u64, DownloadJob)> = entries
            .jobs
            .values()
            .filter(|(_, job)| filter.matches(job))
            .collect();
        matching.sort_by_key(|(seq, _)| *seq);

        matching
            .into_iter()
            .take(filter.limit.unwrap_or(usize::MAX))
            .map(|(_, job)| job.clone())
            .collect()
    }

    fn remove(&self, id: &str) -> Result<DownloadJob, JobStoreError> {
        let mut entries = self.write();
        let status = match entries.jobs.get(id) {
            Some((_, job)) => job.status,
            None => return Err(JobStoreError::NotFound(id.to_string())),
        };
        if !status.is_terminal() {
            return Err(JobStoreError::Active {
                id: id.to_string(),
                status,
            });
        }

        entries
            .jobs
            .remove(id)
            .map(|(_, job)| job)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::JobStatus;
    use crate::retriever::TransferProgress;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn new_job(name: &str) -> NewJob {
        NewJob {
            url1: "https://cdn.example.net/v.mp4".into(),
            url2: "https://cdn.example.net/a.mp4".into(),
            output_path: PathBuf::from(format!("downloads/{}.mp4", name)),
        }
    }

    fn fail(store: &InMemoryJobStore, id: &str) {
        store
            .update(
                id,
                JobUpdate::Failed {
                    message: "boom".into(),
                    kind: None,
                },
            )
            .unwrap();
    }

    #[test]
    fn test_create_and_get() {
        let store = InMemoryJobStore::new();
        let job = store.create(new_job("clip"));

        let fetched = store.get(&job.id).unwrap();
        assert_eq!(fetched, job);
        assert_eq!(fetched.status, JobStatus::Starting);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = InMemoryJobStore::new();
        let a = store.create(new_job("a"));
        let b = store.create(new_job("b"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_get_unknown() {
        let store = InMemoryJobStore::new();
        assert!(store.get("missing").is_none());
        assert_eq!(
            store.update("missing", JobUpdate::Status(JobStatus::Merging)),
            Err(JobStoreError::NotFound("missing".into()))
        );
    }

    #[test]
    fn test_update_returns_snapshot() {
        let store = InMemoryJobStore::new();
        let job = store.create(new_job("clip"));

        let updated = store
            .update(&job.id, JobUpdate::Status(JobStatus::DownloadingVideo))
            .unwrap();
        assert_eq!(updated.status, JobStatus::DownloadingVideo);
        assert!(updated.updated_at >= job.updated_at);
        assert_eq!(store.get(&job.id).unwrap().status, JobStatus::DownloadingVideo);
    }

    #[test]
    fn test_list_in_creation_order_with_filter() {
        let store = InMemoryJobStore::new();
        let ids: Vec<String> = (0..5)
            .map(|i| store.create(new_job(&format!("clip{}", i))).id)
            .collect();
        fail(&store, &ids[1]);
        fail(&store, &ids[3]);

        let all: Vec<String> = store.list(&JobFilter::new()).into_iter().map(|j| j.id).collect();
        assert_eq!(all, ids);

        let failed: Vec<String> = store
            .list(&JobFilter::new().with_status(JobStatus::Error))
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(failed, vec![ids[1].clone(), ids[3].clone()]);

        assert_eq!(store.list(&JobFilter::new().with_limit(2)).len(), 2);
    }

    #[test]
    fn test_remove_only_terminal() {
        let store = InMemoryJobStore::new();
        let job = store.create(new_job("clip"));

        let err = store.remove(&job.id).unwrap_err();
        assert!(matches!(err, JobStoreError::Active { status: JobStatus::Starting, .. }));

        fail(&store, &job.id);
        let removed = store.remove(&job.id).unwrap();
        assert_eq!(removed.status, JobStatus::Error);
        assert!(store.get(&job.id).is_none());
        assert!(matches!(store.remove(&job.id), Err(JobStoreError::NotFound(_))));
    }

    #[test]
    fn test_count_by_status() {
        let store = InMemoryJobStore::new();
        let a = store.create(new_job("a"));
        store.create(new_job("b"));
        fail(&store, &a.id);

        let counts = store.count_by_status();
        assert_eq!(counts[&JobStatus::Starting], 1);
        assert_eq!(counts[&JobStatus::Error], 1);
        assert_eq!(counts[&JobStatus::Complete], 0);
    }

    #[test]
    fn test_concurrent_updates() {
        let store = Arc::new(InMemoryJobStore::new());
        let jobs: Vec<String> = (0..8).map(|i| store.create(new_job(&i.to_string())).id).collect();

        let handles: Vec<_> = jobs
            .iter()
            .cloned()
            .map(|id| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for downloaded in 0..=100u64 {
                        store
                            .update(
                                &id,
                                JobUpdate::VideoProgress(TransferProgress::new(
                                    downloaded,
                                    Some(100),
                                )),
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for id in jobs {
            assert_eq!(store.get(&id).unwrap().video_progress, 100);
        }
    }
}
