use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::game_snapshot;
use crate::entities::TableDoc;
use crate::error::AppError;
use crate::repos::tables;
use crate::services::game_flow::GameFlowService;
use crate::store::GameCode;

/// Watches one table and drives bot turns at it.
pub struct TableAgent {
    service: Arc<GameFlowService>,
    code: GameCode,
    table_id: u32,
}

impl TableAgent {
    pub fn new(service: Arc<GameFlowService>, code: GameCode, table_id: u32) -> Self {
        Self {
            service,
            code,
            table_id,
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let code = self.code.clone();
            let table_id = self.table_id;
            if let Err(err) = self.run(cancel).await {
                warn!(game = %code, table_id, error = %err, "Table agent stopped with error");
            }
        })
    }

    /// Runs until cancelled, the game ends, or a subscription closes.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), AppError> {
        let store = self.service.store();
        let table_path = self.code.table(self.table_id);
        let game_path = self.code.doc();
        let mut table_stream = store.subscribe(&table_path).await?;
        let mut game_stream = store.subscribe(&game_path).await?;
        let mut latest: Option<TableDoc> = None;
        let mut finished = false;

        debug!(game = %self.code, table_id = self.table_id, "Table agent started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                snapshot = table_stream.next() => match snapshot {
                    None => break,
                    Some(None) => continue,
                    Some(Some(doc)) => match tables::from_snapshot(&table_path, doc) {
                        Ok(table) => latest = Some(table),
                        Err(err) => {
                            warn!(path = %table_path, error = %err, "Skipping malformed table snapshot");
                            continue;
                        }
                    },
                },
                snapshot = game_stream.next() => match snapshot {
                    None => break,
                    Some(None) => continue,
                    Some(Some(doc)) => {
                        if game_snapshot(&game_path, doc).is_some_and(|g| g.game_over) {
                            finished = true;
                            break;
                        }
                    }
                },
            }

            let Some(table) = latest.as_ref() else {
                continue;
            };
            self.service.release_stale_bot_claim(&self.code, table);
            if let Err(err) = self.service.maybe_spawn_bot_turn(&self.code, table).await {
                warn!(game = %self.code, table_id = self.table_id, error = %err, "Could not start bot turn");
            }
        }
        if finished {
            self.service.forget_game(&self.code);
        }
        debug!(game = %self.code, table_id = self.table_id, "Table agent stopped");
        Ok(())
    }
}
