//! Error types for the merge orchestrator.

use std::path::PathBuf;
use thiserror::Error;

use crate::remuxer::RemuxerError;
use crate::retriever::RetrieverError;

/// Errors that end a merge run.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Retrieval(#[from] RetrieverError),

    #[error(transparent)]
    Remux(#[from] RemuxerError),

    /// The merged file could not be inspected after remuxing.
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MergeError {
    /// Stable failure category used for metrics and API responses.
    ///
    /// One of `transport`, `filesystem`, `remux_failed` or `remux_unavailable`.
    pub fn kind(&self) -> &'static str {
        match self {
            MergeError::Retrieval(RetrieverError::Filesystem { .. }) => "filesystem",
            MergeError::Retrieval(_) => "transport",
            MergeError::Remux(RemuxerError::RemuxUnavailable { .. }) => "remux_unavailable",
            MergeError::Remux(_) => "remux_failed",
            MergeError::Filesystem { .. } => "filesystem",
        }
    }
}
