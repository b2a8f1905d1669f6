//! Remuxer module for combining elementary streams into one container.
//!
//! The production implementation shells out to `ffmpeg` in stream-copy mode:
//! the video track of the first input and the audio track of the second are
//! mapped into the output without re-encoding.
//!
//! # Example
//!
//! ```ignore
//! use splice_core::remuxer::{FfmpegRemuxer, Remuxer};
//!
//! let remuxer = FfmpegRemuxer::with_defaults();
//! remuxer.validate().await?;
//!
//! let output = remuxer
//!     .remux(Path::new("video.mp4"), Path::new("audio.mp4"), Path::new("clip.mp4"))
//!     .await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;

pub use config::RemuxerConfig;
pub use error::RemuxerError;
pub use ffmpeg::FfmpegRemuxer;
pub use traits::Remuxer;
