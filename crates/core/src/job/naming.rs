//! Output file naming.

use chrono::{DateTime, Utc};

const EXTENSION: &str = ".mp4";
const FALLBACK_NAME: &str = "video";

/// Builds the merged file name `<base>_<YYYY-MM-DD_HHMMSS>.mp4`.
///
/// A trailing `.mp4` on `requested` is dropped so it is not doubled. Path
/// separators, reserved characters and control characters become `_`, and
/// leading dots are removed so the result can never escape the downloads
/// directory or be hidden. An empty result falls back to `default_name`.
pub fn output_file_name(requested: Option<&str>, default_name: &str, now: DateTime<Utc>) -> String {
    let base = requested
        .map(sanitize)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(sanitize(default_name)).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    format!("{}_{}{}", base, now.format("%Y-%m-%d_%H%M%S"), EXTENSION)
}

fn sanitize(name: &str) -> String {
    let trimmed = name.trim();
    let stem = trimmed
        .len()
        .checked_sub(EXTENSION.len())
        .filter(|&split| {
            trimmed
                .get(split..)
                .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
        })
        .map_or(trimmed, |split| &trimmed[..split]);

    let cleaned: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    cleaned.trim_start_matches('.').trim().to_string()
}
