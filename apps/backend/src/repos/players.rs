//! Player document access. Documents are validated as they are read.

use tracing::warn;

use crate::entities::PlayerDoc;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::store::{decode, encode, DocPath, Document, DocumentStore, GameCode};

/// Decode and validate a player snapshot; the document id wins over any stored `id`.
pub fn from_snapshot(path: &DocPath, doc: Document) -> Result<PlayerDoc, AppError> {
    let mut player: PlayerDoc = decode(path, doc)?;
    player.id = path.id().to_string();
    player.validate()?;
    Ok(player)
}

pub async fn find(
    store: &dyn DocumentStore,
    code: &GameCode,
    player_id: &str,
) -> Result<Option<PlayerDoc>, AppError> {
    let path = code.player(player_id);
    match store.get(&path).await? {
        Some(doc) => Ok(Some(from_snapshot(&path, doc)?)),
        None => Ok(None),
    }
}

pub async fn require(
    store: &dyn DocumentStore,
    code: &GameCode,
    player_id: &str,
) -> Result<PlayerDoc, AppError> {
    find(store, code, player_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Player, format!("player {player_id} in {code}"))
            .into()
    })
}

/// Every player in the match, ordered by id.
pub async fn list(store: &dyn DocumentStore, code: &GameCode) -> Result<Vec<PlayerDoc>, AppError> {
    let collection = code.players();
    store
        .list(&collection)
        .await?
        .into_iter()
        .map(|(id, doc)| from_snapshot(&collection.child(&id), doc))
        .collect()
}

/// Every player that decodes and validates, ordered by id.
///
/// Malformed documents are logged and dropped so one bad record cannot block
/// the loops that walk the whole match.
pub async fn list_valid(
    store: &dyn DocumentStore,
    code: &GameCode,
) -> Result<Vec<PlayerDoc>, AppError> {
    let collection = code.players();
    let docs = store.list(&collection).await?;
    let mut players = Vec::with_capacity(docs.len());
    for (id, doc) in docs {
        let path = collection.child(&id);
        match from_snapshot(&path, doc) {
            Ok(player) => players.push(player),
            Err(err) => warn!(path = %path, error = %err, "Skipping malformed player document"),
        }
    }
    Ok(players)
}

pub async fn put(
    store: &dyn DocumentStore,
    code: &GameCode,
    player: &PlayerDoc,
) -> Result<(), AppError> {
    let path = code.player(&player.id);
    store.set(&path, encode(&path, player)?, false).await?;
    Ok(())
}

pub async fn update(
    store: &dyn DocumentStore,
    code: &GameCode,
    player_id: &str,
    fields: Document,
) -> Result<(), AppError> {
    store.set(&code.player(player_id), fields, true).await?;
    Ok(())
}

pub async fn increment(
    store: &dyn DocumentStore,
    code: &GameCode,
    player_id: &str,
    field: &str,
    delta: i64,
) -> Result<(), AppError> {
    store.increment(&code.player(player_id), field, delta).await?;
    Ok(())
}
