//! Configuration for HTTP retrieval.

use serde::{Deserialize, Serialize};

/// Request identity and timeouts for source fetches.
///
/// The origin CDN rejects requests without a browser user agent, a referer
/// on the origin site and a do-not-track header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrieverConfig {
    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// `Referer` sent with every request.
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Whether to send `DNT: 1`.
    #[serde(default = "default_do_not_track")]
    pub do_not_track: bool,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum silence between two body chunks in seconds (0 = wait forever).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/143.0.0.0 Safari/537.36"
        .to_string()
}

fn default_referer() -> String {
    "https://www.facebook.com/".to_string()
}

fn default_do_not_track() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    60
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            referer: default_referer(),
            do_not_track: default_do_not_track(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl RetrieverConfig {
    /// Sets the referer.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    /// Sets the idle timeout in seconds.
    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}
