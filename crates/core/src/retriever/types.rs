//! Types for the retriever module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Byte counters for an in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgress {
    /// Bytes received so far.
    pub downloaded: u64,
    /// Declared size, `None` when the origin did not announce one.
    pub total: Option<u64>,
}

impl TransferProgress {
    pub fn new(downloaded: u64, total: Option<u64>) -> Self {
        Self { downloaded, total }
    }

    /// Completion percentage, capped at 100.
    ///
    /// Returns `None` when the total is unknown or zero.
    pub fn percent(&self) -> Option<u8> {
        match self.total {
            Some(total) if total > 0 => {
                let pct = (self.downloaded as f64 / total as f64 * 100.0).round();
                Some(pct.min(100.0) as u8)
            }
            _ => None,
        }
    }
}

/// Callback invoked after every received chunk.
pub type ProgressCallback = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// Outcome of a completed retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Where the stream was written.
    pub path: PathBuf,
    /// Size declared by the probe, if any.
    pub total_bytes: Option<u64>,
    /// Bytes actually written.
    pub bytes_written: u64,
}
