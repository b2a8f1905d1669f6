use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::remuxer::RemuxerConfig;
use crate::retriever::RetrieverConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub http: RetrieverConfig,
    #[serde(default)]
    pub remuxer: RemuxerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

/// Where merged files go and how many merges run at once
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DownloadsConfig {
    /// Output directory, created at startup if missing.
    #[serde(default = "default_downloads_dir")]
    pub dir: PathBuf,
    /// Upper bound on merges running concurrently.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    /// Base name used when a request gives none.
    #[serde(default = "default_filename")]
    pub default_filename: String,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dir: default_downloads_dir(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            default_filename: default_filename(),
        }
    }
}

impl DownloadsConfig {
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max;
        self
    }
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_filename() -> String {
    "video".to_string()
}
