use std::sync::Arc;
use splice_core::{Config, DownloadManager, JobStore};

/// Shared application state
pub struct AppState {
    config: Config,
    manager: DownloadManager,
}

impl AppState {
    pub fn new(config: Config, manager: DownloadManager) -> Self {
        Self { config, manager }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &DownloadManager {
        &self.manager
    }

    pub fn job_store(&self) -> &Arc<dyn JobStore> {
        self.manager.store()
    }
}
