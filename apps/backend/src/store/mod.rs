//! Shared-state contract.
//!
//! Every component reads and writes match state through [`DocumentStore`].
//! Updates are last-writer-wins field merges; the only atomic primitive is
//! [`DocumentStore::increment`]. There is no compare-and-swap.

pub mod codec;
pub mod faulty;
pub mod memory;
pub mod paths;
pub mod redis_store;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

pub use codec::{decode, encode, fields};
pub use faulty::FaultyStore;
pub use memory::MemoryStore;
pub use paths::{CollectionPath, DocPath, GameCode};
pub use redis_store::RedisStore;

/// A document is a flat JSON object keyed by field name.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Snapshots of one document. `None` means the document does not exist.
pub type DocStream = BoxStream<'static, Option<Document>>;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("write to {path} rejected: {detail}")]
    Rejected { path: String, detail: String },
    #[error("codec failure at {path}: {detail}")]
    Codec { path: String, detail: String },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError>;

    /// Every existing document directly under `collection`, as `(id, document)`.
    async fn list(&self, collection: &CollectionPath)
        -> Result<Vec<(String, Document)>, StoreError>;

    /// With `merge` the given fields overwrite matching fields and keep the
    /// rest; without it the document is replaced.
    async fn set(&self, path: &DocPath, fields: Document, merge: bool) -> Result<(), StoreError>;

    /// Atomically add `delta` to an integer field, creating it (and the
    /// document) at zero when absent.
    async fn increment(&self, path: &DocPath, field: &str, delta: i64) -> Result<(), StoreError>;

    /// The first item is the current value; later items follow changes.
    /// Intermediate values may be coalesced but the latest is always delivered.
    async fn subscribe(&self, path: &DocPath) -> Result<DocStream, StoreError>;
}
