//! Process-local document store.
//!
//! One `watch` channel per document: a subscriber always sees the latest
//! value and may miss intermediate ones, which is all the contract promises.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::{CollectionPath, DocPath, DocStream, Document, DocumentStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, watch::Sender<Option<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently present. Handy for assertions.
    pub fn len(&self) -> usize {
        self.docs
            .lock()
            .values()
            .filter(|tx| tx.borrow().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn new_slot() -> watch::Sender<Option<Document>> {
    watch::channel(None).0
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.lock();
        Ok(docs.get(path.as_str()).and_then(|tx| tx.borrow().clone()))
    }

    async fn list(
        &self,
        collection: &CollectionPath,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let docs = self.docs.lock();
        let mut out: Vec<(String, Document)> = docs
            .iter()
            .filter(|(key, _)| collection.contains(key))
            .filter_map(|(key, tx)| {
                let doc = tx.borrow().clone()?;
                let id = key.rsplit('/').next().unwrap_or(key).to_string();
                Some((id, doc))
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    async fn set(&self, path: &DocPath, fields: Document, merge: bool) -> Result<(), StoreError> {
        let mut docs = self.docs.lock();
        let slot = docs.entry(path.as_str().to_string()).or_insert_with(new_slot);
        slot.send_if_modified(|current| {
            let next = match (merge, current.as_ref()) {
                (true, Some(existing)) => {
                    let mut merged = existing.clone();
                    merged.extend(fields);
                    merged
                }
                _ => fields,
            };
            if current.as_ref() == Some(&next) {
                return false;
            }
            *current = Some(next);
            true
        });
        Ok(())
    }

    async fn increment(&self, path: &DocPath, field: &str, delta: i64) -> Result<(), StoreError> {
        let mut docs = self.docs.lock();
        let slot = docs.entry(path.as_str().to_string()).or_insert_with(new_slot);

        if let Some(existing) = slot.borrow().as_ref().and_then(|doc| doc.get(field)) {
            if !existing.is_i64() && !existing.is_null() {
                return Err(StoreError::Codec {
                    path: path.to_string(),
                    detail: format!("field {field} is not an integer"),
                });
            }
        }

        slot.send_modify(|current| {
            let doc = current.get_or_insert_with(Document::new);
            let base = doc.get(field).and_then(Value::as_i64).unwrap_or(0);
            doc.insert(field.to_string(), Value::from(base + delta));
        });
        Ok(())
    }

    async fn subscribe(&self, path: &DocPath) -> Result<DocStream, StoreError> {
        let mut docs = self.docs.lock();
        let slot = docs.entry(path.as_str().to_string()).or_insert_with(new_slot);
        Ok(WatchStream::new(slot.subscribe()).boxed())
    }
}
