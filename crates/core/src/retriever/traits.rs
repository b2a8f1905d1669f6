//! Trait definitions for the retriever module.

use async_trait::async_trait;
use std::path::Path;

use super::error::RetrieverError;
use super::types::{ProgressCallback, RetrievalResult};

/// Fetches one stream into a local file.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns the name of this retriever implementation.
    fn name(&self) -> &str;

    /// Retrieves the full resource behind `url` into `destination`.
    ///
    /// `on_progress` is called synchronously after every chunk and must be
    /// cheap. No retry is attempted; a partially written file is left for
    /// the caller to clean up.
    async fn retrieve(
        &self,
        url: &str,
        destination: &Path,
        on_progress: Option<ProgressCallback>,
    ) -> Result<RetrievalResult, RetrieverError>;
}
