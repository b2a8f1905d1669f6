//! Stream role classification from embedded encode metadata.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Query parameter holding the base64 encoded encode descriptor.
const METADATA_PARAM: &str = "efg";

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Role of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamRole {
    Video,
    Audio,
    Unknown,
}

impl StreamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamRole::Video => "video",
            StreamRole::Audio => "audio",
            StreamRole::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, StreamRole::Unknown)
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a stream URL as video, audio or unknown.
///
/// Never fails: a missing, undecodable or uninformative `efg` parameter
/// yields [`StreamRole::Unknown`].
pub fn classify(url: &str) -> StreamRole {
    match decode_metadata(url) {
        Some(decoded) => role_from_metadata(&decoded),
        None => StreamRole::Unknown,
    }
}

fn decode_metadata(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let raw = parsed
        .query_pairs()
        .find(|(key, _)| key == METADATA_PARAM)
        .map(|(_, value)| value.into_owned())?;

    // Form decoding turns a literal '+' into a space.
    let cleaned: String = raw
        .chars()
        .map(|c| if c == ' ' { '+' } else { c })
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let bytes = STANDARD_LENIENT
        .decode(cleaned.as_bytes())
        .or_else(|_| URL_SAFE_LENIENT.decode(cleaned.as_bytes()))
        .ok()?;

    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn role_from_metadata(decoded: &str) -> StreamRole {
    // Tag suffixes such as `vencode_tag_audio` are authoritative; bare words
    // can appear in unrelated fields.
    if decoded.contains("_audio") {
        return StreamRole::Audio;
    }
    if decoded.contains("_video") {
        return StreamRole::Video;
    }
    if decoded.contains("audio") {
        return StreamRole::Audio;
    }
    if decoded.contains("video") {
        return StreamRole::Video;
    }
    StreamRole::Unknown
}

/// How a [`StreamPair`] was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    /// Both URLs classified to distinct known roles.
    Detected,
    /// Classification was ambiguous; first URL taken as video.
    Positional,
}

/// Video and audio URLs in merge order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPair {
    pub video_url: String,
    pub audio_url: String,
    pub pairing: Pairing,
}

/// Assigns the video and audio roles to two URLs.
///
/// Only an unambiguous `{video, audio}` classification reorders the input.
/// Anything else falls back to first = video, second = audio; a mispaired
/// input then produces a merge with swapped tracks rather than an error.
pub fn pair_streams(url1: &str, url2: &str) -> StreamPair {
    let (video_url, audio_url, pairing) = match (classify(url1), classify(url2)) {
        (StreamRole::Video, StreamRole::Audio) => (url1, url2, Pairing::Detected),
        (StreamRole::Audio, StreamRole::Video) => (url2, url1, Pairing::Detected),
        _ => (url1, url2, Pairing::Positional),
    };

    StreamPair {
        video_url: video_url.to_string(),
        audio_url: audio_url.to_string(),
        pairing,
    }
}

/// Rejection of a URL pair before a job is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error(
        "Both URLs are {0} streams! You need one VIDEO and one AUDIO URL. \
         Look for a smaller file (~5-20 MB) with /m311/ in the path for audio."
    )]
    SameRole(StreamRole),
}

/// Rejects pairs where both URLs classify to the same known role.
///
/// Unknown roles are accepted; the orchestrator falls back to positional
/// pairing for them.
pub fn validate_pair(url1: &str, url2: &str) -> Result<(StreamRole, StreamRole), PairingError> {
    let first = classify(url1);
    let second = classify(url2);

    if first == second && first.is_known() {
        return Err(PairingError::SameRole(first));
    }

    Ok((first, second))
}
