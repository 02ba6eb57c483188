//! Redis-backed document store.
//!
//! Layout:
//! - `bunco:doc:{path}`: hash, one JSON-encoded value per field
//! - `bunco:idx:{collection}`: set of child ids
//! - `bunco:chan:{path}`: pub/sub channel notified after every write
//!
//! Subscriptions re-read the whole document on each notification, so a
//! burst of writes may collapse into one snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use super::{CollectionPath, DocPath, DocStream, Document, DocumentStore, StoreError};

const DOC_PREFIX: &str = "bunco:doc:";
const INDEX_PREFIX: &str = "bunco:idx:";
const CHANNEL_PREFIX: &str = "bunco:chan:";
const SUBSCRIPTION_BUFFER: usize = 16;

#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)
            .map_err(|err| StoreError::Unavailable(format!("invalid REDIS_URL: {err}")))?;
        let conn = ConnectionManager::new(client.clone())
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self { client, conn })
    }
}

fn doc_key(path: &DocPath) -> String {
    format!("{DOC_PREFIX}{path}")
}

fn index_key(collection: &CollectionPath) -> String {
    format!("{INDEX_PREFIX}{collection}")
}

fn channel(path: &DocPath) -> String {
    format!("{CHANNEL_PREFIX}{path}")
}

fn map_err(path: &DocPath, err: RedisError) -> StoreError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Rejected {
            path: path.to_string(),
            detail: err.to_string(),
        }
    }
}

fn decode_hash(path: &DocPath, raw: HashMap<String, String>) -> Result<Option<Document>, StoreError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let mut doc = Document::new();
    for (field, encoded) in raw {
        let value: Value = serde_json::from_str(&encoded).map_err(|err| StoreError::Codec {
            path: path.to_string(),
            detail: format!("field {field}: {err}"),
        })?;
        doc.insert(field, value);
    }
    Ok(Some(doc))
}

async fn read_doc(
    conn: &mut ConnectionManager,
    path: &DocPath,
) -> Result<Option<Document>, StoreError> {
    let raw: HashMap<String, String> = redis::cmd("HGETALL")
        .arg(doc_key(path))
        .query_async(conn)
        .await
        .map_err(|err| map_err(path, err))?;
    decode_hash(path, raw)
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let mut conn = self.conn.clone();
        read_doc(&mut conn, path).await
    }

    async fn list(
        &self,
        collection: &CollectionPath,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let mut conn = self.conn.clone();
        let mut ids: Vec<String> = redis::cmd("SMEMBERS")
            .arg(index_key(collection))
            .query_async(&mut conn)
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        ids.sort();

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let path = collection.child(&id);
            if let Some(doc) = read_doc(&mut conn, &path).await? {
                out.push((id, doc));
            }
        }
        Ok(out)
    }

    async fn set(&self, path: &DocPath, fields: Document, merge: bool) -> Result<(), StoreError> {
        let key = doc_key(path);
        let mut pairs = Vec::with_capacity(fields.len());
        for (field, value) in &fields {
            let encoded = serde_json::to_string(value).map_err(|err| StoreError::Codec {
                path: path.to_string(),
                detail: err.to_string(),
            })?;
            pairs.push((field.clone(), encoded));
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        if !merge {
            pipe.cmd("DEL").arg(&key).ignore();
        }
        if !pairs.is_empty() {
            pipe.cmd("HSET").arg(&key).arg(&pairs).ignore();
        }
        if let Some(collection) = path.collection() {
            pipe.cmd("SADD")
                .arg(index_key(&collection))
                .arg(path.id())
                .ignore();
        }
        pipe.cmd("PUBLISH").arg(channel(path)).arg("set").ignore();

        let mut conn = self.conn.clone();
        let () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|err| map_err(path, err))?;
        Ok(())
    }

    async fn increment(&self, path: &DocPath, field: &str, delta: i64) -> Result<(), StoreError> {
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("HINCRBY")
            .arg(doc_key(path))
            .arg(field)
            .arg(delta)
            .ignore();
        if let Some(collection) = path.collection() {
            pipe.cmd("SADD")
                .arg(index_key(&collection))
                .arg(path.id())
                .ignore();
        }
        pipe.cmd("PUBLISH").arg(channel(path)).arg("incr").ignore();

        let mut conn = self.conn.clone();
        let () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|err| map_err(path, err))?;
        Ok(())
    }

    async fn subscribe(&self, path: &DocPath) -> Result<DocStream, StoreError> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        pubsub
            .subscribe(channel(path))
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        // Subscribed before the first read, so no write can fall in between.
        let mut conn = self.conn.clone();
        let initial = read_doc(&mut conn, path).await?;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let path = path.clone();
        tokio::spawn(async move {
            if tx.send(initial).await.is_err() {
                return;
            }
            let mut messages = Box::pin(pubsub.into_on_message());
            while messages.next().await.is_some() {
                match read_doc(&mut conn, &path).await {
                    Ok(doc) => {
                        if tx.send(doc).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(path = %path, error = %err, "Failed to re-read document after notification");
                    }
                }
            }
            debug!(path = %path, "Redis subscription ended");
        });

        Ok(ReceiverStream::new(rx).boxed())
    }
}
