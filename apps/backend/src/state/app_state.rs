use std::sync::Arc;

use crate::config::EngineConfig;
use crate::store::DocumentStore;

/// Shared resources handed to services and agents.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
