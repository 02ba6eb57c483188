//! Store wrapper that rejects writes to chosen documents.
//!
//! Reads and subscriptions always pass through, so the rest of a match keeps
//! working while one document is "broken".

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CollectionPath, DocPath, DocStream, Document, DocumentStore, StoreError};

pub struct FaultyStore {
    inner: Arc<dyn DocumentStore>,
    failing: RwLock<HashSet<String>>,
    rejected: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            failing: RwLock::new(HashSet::new()),
            rejected: AtomicUsize::new(0),
        }
    }

    /// Reject every subsequent write to `path`.
    pub fn fail_writes_to(&self, path: &DocPath) {
        self.failing.write().insert(path.as_str().to_string());
    }

    pub fn heal(&self, path: &DocPath) {
        self.failing.write().remove(path.as_str());
    }

    /// How many writes have been rejected so far.
    pub fn rejected_writes(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }

    fn check(&self, path: &DocPath) -> Result<(), StoreError> {
        if self.failing.read().contains(path.as_str()) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Rejected {
                path: path.to_string(),
                detail: "injected fault".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        self.inner.get(path).await
    }

    async fn list(
        &self,
        collection: &CollectionPath,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        self.inner.list(collection).await
    }

    async fn set(&self, path: &DocPath, fields: Document, merge: bool) -> Result<(), StoreError> {
        self.check(path)?;
        self.inner.set(path, fields, merge).await
    }

    async fn increment(&self, path: &DocPath, field: &str, delta: i64) -> Result<(), StoreError> {
        self.check(path)?;
        self.inner.increment(path, field, delta).await
    }

    async fn subscribe(&self, path: &DocPath) -> Result<DocStream, StoreError> {
        self.inner.subscribe(path).await
    }
}
