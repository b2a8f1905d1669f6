//! Testing utilities and mock implementations.
//!
//! Mocks for the [`Retriever`](crate::retriever::Retriever) and
//! [`Remuxer`](crate::remuxer::Remuxer) traits let the orchestrator, the
//! download manager and the HTTP API be exercised without network access
//! or an ffmpeg binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use splice_core::testing::{fixtures, MockRemuxer, MockRetriever};
//!
//! let retriever = MockRetriever::new();
//! let remuxer = MockRemuxer::new();
//!
//! retriever.set_payload(&fixtures::video_url(), vec![0u8; 4096]).await;
//! remuxer.set_next_error(RemuxerError::failed(Some(1), "Invalid data found", 500)).await;
//! ```

mod mock_remuxer;
mod mock_retriever;

pub use mock_remuxer::{MockRemuxer, RecordedRemux};
pub use mock_retriever::{MockRetriever, RecordedRetrieval};

/// Test fixtures and helper functions.
pub mod fixtures {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use url::Url;

    const BASE_URL: &str = "https://video.example.net/v/t42.1790-2/clip.mp4";

    /// Builds a stream URL whose `efg` parameter is the base64 encoding of
    /// `metadata`, followed by the `extra` query pairs.
    pub fn stream_url(metadata: &str, extra: &[(&str, &str)]) -> String {
        stream_url_with_metadata(&STANDARD.encode(metadata), extra)
    }

    /// Builds a stream URL with `efg` set verbatim.
    pub fn stream_url_with_metadata(efg: &str, extra: &[(&str, &str)]) -> String {
        let mut url = Url::parse(BASE_URL).expect("fixture base url is valid");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("efg", efg);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }
        url.to_string()
    }

    /// A video stream URL as copied from a browser, byte range included.
    pub fn video_url() -> String {
        stream_url(
            r#"{"vencode_tag":"dash_h264-basic-gen2_720p_video","bitrate":1270000}"#,
            &[("_nc_ht", "video.example.net"), ("bytestart", "0"), ("byteend", "1023")],
        )
    }

    /// An audio stream URL as copied from a browser, byte range included.
    pub fn audio_url() -> String {
        stream_url(
            r#"{"vencode_tag":"dash_ln_heaac_vbr3_audio","bitrate":64000}"#,
            &[("_nc_ht", "video.example.net"), ("bytestart", "0"), ("byteend", "511")],
        )
    }

    /// A URL with no classification metadata.
    pub fn unknown_url(name: &str) -> String {
        format!("https://cdn.example.net/media/{}.mp4", name)
    }
}
