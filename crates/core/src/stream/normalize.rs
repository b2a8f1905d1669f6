//! Byte-range parameter stripping.

use url::form_urlencoded;
use url::Url;

/// Query parameters a player adds to request a slice of the resource.
pub const RANGE_PARAMS: [&str; 2] = ["bytestart", "byteend"];

/// Removes the byte-range parameters from a stream URL.
///
/// Every other query parameter is kept byte-for-byte in its original order.
/// A URL that does not parse is returned unchanged; the network layer will
/// report the real problem when it is fetched.
pub fn normalize_url(url: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };

    let kept: Vec<String> = match parsed.query() {
        Some(query) => query
            .split('&')
            .filter(|segment| !segment.is_empty() && !is_range_param(segment))
            .map(str::to_string)
            .collect(),
        None => return parsed.to_string(),
    };

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.set_query(Some(&kept.join("&")));
    }

    parsed.to_string()
}

fn is_range_param(segment: &str) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| RANGE_PARAMS.contains(&key.as_ref()))
        .unwrap_or(false)
}
