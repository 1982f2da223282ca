//! Application state shared across handlers

use std::sync::Arc;

use common::{RemoteStorage, StorageConfig};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StorageConfig>,
    pub remote: Arc<dyn RemoteStorage>,
}

impl AppState {
    pub fn new(config: StorageConfig, remote: Arc<dyn RemoteStorage>) -> Self {
        Self {
            config: Arc::new(config),
            remote,
        }
    }
}
