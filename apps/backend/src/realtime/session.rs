use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{game_snapshot, HostAgent, TableAgent};
use crate::error::AppError;
use crate::repos::players;
use crate::services::game_flow::GameFlowService;
use crate::store::GameCode;

/// Handle to a running [`ClientSession`].
pub struct SessionHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SessionHandle {
    /// Stop the session and its agents, waiting for them to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.join.await {
            warn!(error = %err, "Client session task panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

struct RunningAgent {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl RunningAgent {
    async fn stop(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }
}

/// One connected client: follows its own player document, keeps a
/// [`TableAgent`] on whichever table the player sits at, and runs a
/// [`HostAgent`] when the player is the host.
pub struct ClientSession {
    service: Arc<GameFlowService>,
    code: GameCode,
    player_id: String,
}

impl ClientSession {
    pub fn new(service: Arc<GameFlowService>, code: GameCode, player_id: impl Into<String>) -> Self {
        Self {
            service,
            code,
            player_id: player_id.into(),
        }
    }

    pub fn spawn(self) -> SessionHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            let code = self.code.clone();
            let player_id = self.player_id.clone();
            if let Err(err) = self.run(token).await {
                warn!(game = %code, player_id, error = %err, "Client session stopped with error");
            }
        });
        SessionHandle { cancel, join }
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<(), AppError> {
        let store = self.service.store();
        let player_path = self.code.player(&self.player_id);
        let game_path = self.code.doc();
        let mut player_stream = store.subscribe(&player_path).await?;
        let mut game_stream = store.subscribe(&game_path).await?;

        let mut table_agent: Option<(u32, RunningAgent)> = None;
        let mut host_agent: Option<RunningAgent> = None;

        loop {
            let doc = tokio::select! {
                _ = cancel.cancelled() => break,
                snapshot = game_stream.next() => match snapshot {
                    None => break,
                    Some(Some(doc)) if game_snapshot(&game_path, doc.clone()).is_some_and(|g| g.game_over) => break,
                    Some(_) => continue,
                },
                snapshot = player_stream.next() => match snapshot {
                    None => break,
                    Some(None) => continue,
                    Some(Some(doc)) => doc,
                },
            };

            let player = match players::from_snapshot(&player_path, doc) {
                Ok(player) => player,
                Err(err) => {
                    warn!(path = %player_path, error = %err, "Skipping malformed player snapshot");
                    continue;
                }
            };

            if player.is_host && host_agent.is_none() {
                let token = cancel.child_token();
                let join = HostAgent::new(self.service.clone(), self.code.clone()).spawn(token.clone());
                host_agent = Some(RunningAgent {
                    cancel: token,
                    join,
                });
            }

            let current = table_agent.as_ref().map(|(id, _)| *id);
            if current != player.table {
                if let Some((old, agent)) = table_agent.take() {
                    debug!(game = %self.code, player_id = %self.player_id, from = old, "Leaving table");
                    agent.stop().await;
                }
                if let Some(table_id) = player.table {
                    debug!(game = %self.code, player_id = %self.player_id, table_id, "Following player to table");
                    let token = cancel.child_token();
                    let join = TableAgent::new(self.service.clone(), self.code.clone(), table_id)
                        .spawn(token.clone());
                    table_agent = Some((
                        table_id,
                        RunningAgent {
                            cancel: token,
                            join,
                        },
                    ));
                }
            }
        }

        if let Some((_, agent)) = table_agent {
            agent.stop().await;
        }
        if let Some(agent) = host_agent {
            agent.stop().await;
        }
        Ok(())
    }
}
