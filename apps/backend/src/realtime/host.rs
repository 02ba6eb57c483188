use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::repos::games;
use crate::services::game_flow::{Disposition, GameFlowService};
use crate::store::GameCode;

/// The host's safety net: periodic round-end and win checks, plus optional
/// automatic round transitions.
pub struct HostAgent {
    service: Arc<GameFlowService>,
    code: GameCode,
    auto_advance: bool,
}

impl HostAgent {
    pub fn new(service: Arc<GameFlowService>, code: GameCode) -> Self {
        let auto_advance = service.config().auto_advance_rounds;
        Self {
            service,
            code,
            auto_advance,
        }
    }

    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let code = self.code.clone();
            if let Err(err) = self.run(cancel).await {
                warn!(game = %code, error = %err, "Host agent stopped with error");
            }
        })
    }

    /// Runs until cancelled or the game is over.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), AppError> {
        let mut ticker = interval(self.service.config().timings.monitor_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut game_stream = self.service.store().subscribe(&self.code.doc()).await?;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                snapshot = game_stream.next() => {
                    if snapshot.is_none() {
                        break;
                    }
                }
            }

            match self.tick().await {
                Ok(true) => {
                    info!(game = %self.code, "Game over, host agent exiting");
                    break;
                }
                Ok(false) => {}
                Err(err) if err.is_transient() => {
                    debug!(game = %self.code, error = %err, "Store unavailable, retrying next tick");
                }
                Err(err) => warn!(game = %self.code, error = %err, "Host check failed, retrying next tick"),
            }
        }
        Ok(())
    }

    /// One pass of the checks. Returns whether the game is over.
    pub async fn tick(&self) -> Result<bool, AppError> {
        let service = &self.service;
        service.check_head_table_for_round_end(&self.code).await?;

        let game = games::require(service.store(), &self.code).await?;
        if game.game_over {
            return Ok(true);
        }
        if !game.started {
            return Ok(false);
        }

        if self.auto_advance && game.next_round_ready && !game.round_transition_in_progress {
            match service.transition_to_next_round(&self.code).await? {
                Disposition::Applied(report) => {
                    if report.tournament_winner.is_some() {
                        return Ok(true);
                    }
                }
                Disposition::Ignored(reason) => {
                    debug!(game = %self.code, ?reason, "Automatic transition skipped");
                }
            }
        }

        Ok(service.check_win_condition(&self.code).await?.is_some())
    }
}
