//! Table document access. Documents are validated as they are read.

use crate::entities::TableDoc;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::store::{decode, encode, DocPath, Document, DocumentStore, GameCode};

pub fn from_snapshot(path: &DocPath, doc: Document) -> Result<TableDoc, AppError> {
    let mut table: TableDoc = decode(path, doc)?;
    if let Ok(id) = path.id().parse() {
        table.id = id;
    }
    table.validate()?;
    Ok(table)
}

pub async fn find(
    store: &dyn DocumentStore,
    code: &GameCode,
    table_id: u32,
) -> Result<Option<TableDoc>, AppError> {
    let path = code.table(table_id);
    match store.get(&path).await? {
        Some(doc) => Ok(Some(from_snapshot(&path, doc)?)),
        None => Ok(None),
    }
}

pub async fn require(
    store: &dyn DocumentStore,
    code: &GameCode,
    table_id: u32,
) -> Result<TableDoc, AppError> {
    find(store, code, table_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Table, format!("table {table_id} in {code}")).into()
    })
}

/// Every table in the match, ordered by numeric id.
pub async fn list(store: &dyn DocumentStore, code: &GameCode) -> Result<Vec<TableDoc>, AppError> {
    let collection = code.tables();
    let mut tables = store
        .list(&collection)
        .await?
        .into_iter()
        .map(|(id, doc)| from_snapshot(&collection.child(&id), doc))
        .collect::<Result<Vec<_>, _>>()?;
    tables.sort_by_key(|t| t.id);
    Ok(tables)
}

pub async fn put(store: &dyn DocumentStore, code: &GameCode, table: &TableDoc) -> Result<(), AppError> {
    let path = code.table(table.id);
    store.set(&path, encode(&path, table)?, false).await?;
    Ok(())
}

pub async fn update(
    store: &dyn DocumentStore,
    code: &GameCode,
    table_id: u32,
    fields: Document,
) -> Result<(), AppError> {
    store.set(&code.table(table_id), fields, true).await?;
    Ok(())
}
