//! Game document access.

use crate::entities::GameDoc;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::store::{decode, encode, DocPath, Document, DocumentStore, GameCode};

pub fn from_snapshot(path: &DocPath, doc: Document) -> Result<GameDoc, AppError> {
    let game: GameDoc = decode(path, doc)?;
    game.validate()?;
    Ok(game)
}

pub async fn find(store: &dyn DocumentStore, code: &GameCode) -> Result<Option<GameDoc>, AppError> {
    let path = code.doc();
    match store.get(&path).await? {
        Some(doc) => Ok(Some(from_snapshot(&path, doc)?)),
        None => Ok(None),
    }
}

pub async fn require(store: &dyn DocumentStore, code: &GameCode) -> Result<GameDoc, AppError> {
    find(store, code).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Game, format!("game {code}")).into()
    })
}

/// Write the whole game document, replacing what was there.
pub async fn put(store: &dyn DocumentStore, code: &GameCode, game: &GameDoc) -> Result<(), AppError> {
    let path = code.doc();
    store.set(&path, encode(&path, game)?, false).await?;
    Ok(())
}

/// Merge `fields` into the game document.
pub async fn update(
    store: &dyn DocumentStore,
    code: &GameCode,
    fields: Document,
) -> Result<(), AppError> {
    store.set(&code.doc(), fields, true).await?;
    Ok(())
}

pub async fn increment(
    store: &dyn DocumentStore,
    code: &GameCode,
    field: &str,
    delta: i64,
) -> Result<(), AppError> {
    store.increment(&code.doc(), field, delta).await?;
    Ok(())
}
