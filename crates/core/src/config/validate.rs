use super::{types::Config, ConfigError};

const FFMPEG_LOG_LEVELS: &[&str] = &[
    "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
];

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one job may run
/// - Downloads directory and ffmpeg path are set
/// - The ffmpeg log level is one ffmpeg understands
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Downloads validation
    if config.downloads.max_concurrent_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "downloads.max_concurrent_jobs must be at least 1".to_string(),
        ));
    }
    if config.downloads.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "downloads.dir cannot be empty".to_string(),
        ));
    }

    // Remuxer validation
    if config.remuxer.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "remuxer.ffmpeg_path cannot be empty".to_string(),
        ));
    }
    if !FFMPEG_LOG_LEVELS.contains(&config.remuxer.log_level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "remuxer.log_level '{}' is not an ffmpeg log level",
            config.remuxer.log_level
        )));
    }

    Ok(())
}
