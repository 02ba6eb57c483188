use std::env;
use std::sync::Arc;

use crate::error::AppError;
use crate::store::{DocumentStore, MemoryStore, RedisStore};

/// Which shared-state backend to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Redis { url: String },
}

impl StoreConfig {
    /// `BUNCO_STORE=memory|redis` (default memory); redis requires `REDIS_URL`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        match lookup("BUNCO_STORE").as_deref() {
            None | Some("memory") => Ok(StoreConfig::Memory),
            Some("redis") => {
                let url = lookup("REDIS_URL").ok_or_else(|| {
                    AppError::config("BUNCO_STORE=redis requires REDIS_URL".to_string())
                })?;
                Ok(StoreConfig::Redis { url })
            }
            Some(other) => Err(AppError::config(format!(
                "BUNCO_STORE must be 'memory' or 'redis', got '{other}'"
            ))),
        }
    }

    pub async fn connect(&self) -> Result<Arc<dyn DocumentStore>, AppError> {
        match self {
            StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreConfig::Redis { url } => Ok(Arc::new(RedisStore::connect(url).await?)),
        }
    }
}
