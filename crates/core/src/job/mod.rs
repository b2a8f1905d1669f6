//! Download jobs: the registry, output naming and the background manager.
//!
//! The registry is the only shared mutable state. Each job is created in
//! `starting` state, moves forward as the orchestrator reports progress and
//! ends in `complete` or `error`, after which its record is frozen.

mod manager;
mod memory_store;
mod naming;
mod store;
mod types;

pub use manager::{DownloadManager, ManagerError, MergeRequest};
pub use memory_store::InMemoryJobStore;
pub use naming::output_file_name;
pub use store::{JobFilter, JobStore, JobStoreError};
pub use types::{DownloadJob, JobUpdate, NewJob};
