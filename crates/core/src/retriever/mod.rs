//! Retriever module for fetching elementary streams over HTTP.
//!
//! A retrieval normalizes the source URL, probes it with a `HEAD` request to
//! learn the declared size, then streams the body straight to disk while
//! reporting progress after every chunk.
//!
//! # Example
//!
//! ```ignore
//! use splice_core::retriever::{HttpRetriever, Retriever, RetrieverConfig};
//!
//! let retriever = HttpRetriever::new(RetrieverConfig::default())?;
//! let progress: ProgressCallback = Arc::new(|p: TransferProgress| {
//!     println!("{} / {:?}", p.downloaded, p.total);
//! });
//!
//! let result = retriever
//!     .retrieve(&video_url, Path::new("downloads/.temp_video.mp4"), Some(progress))
//!     .await?;
//! println!("wrote {} bytes to {:?}", result.bytes_written, result.path);
//! ```

mod config;
mod error;
mod http;
mod traits;
mod types;

pub use config::RetrieverConfig;
pub use error::RetrieverError;
pub use http::HttpRetriever;
pub use traits::Retriever;
pub use types::{ProgressCallback, RetrievalResult, TransferProgress};
