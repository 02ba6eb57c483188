use std::sync::Arc;

use crate::config::{EngineConfig, StoreConfig};
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::store::DocumentStore;

/// Builder for creating AppState instances (used by the simulator and tests)
pub struct StateBuilder {
    config: EngineConfig,
    store_config: StoreConfig,
    store: Option<Arc<dyn DocumentStore>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            store_config: StoreConfig::Memory,
            store: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store_config(mut self, store_config: StoreConfig) -> Self {
        self.store_config = store_config;
        self
    }

    /// Use an already-built store; takes precedence over the store config.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Read both engine and store configuration from the environment.
    pub fn from_env(self) -> Result<Self, AppError> {
        Ok(self
            .with_config(EngineConfig::from_env()?)
            .with_store_config(StoreConfig::from_env()?))
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let store = match self.store {
            Some(store) => store,
            None => self.store_config.connect().await?,
        };
        Ok(AppState::new(store, self.config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
