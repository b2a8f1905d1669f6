//! Merge orchestration for a single download job.
//!
//! The orchestrator owns no state between runs. It pairs the URLs, fetches
//! the video stream then the audio stream, hands both to the remuxer and
//! reports progress through [`MergeCallbacks`].

mod error;
mod runner;
mod types;

pub use error::MergeError;
pub use runner::MergeOrchestrator;
pub use types::{JobStatus, MergeCallbacks, MergeOutcome, StatusCallback};
