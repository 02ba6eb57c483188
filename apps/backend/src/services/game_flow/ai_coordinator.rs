use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{table_key, BotTurnClaim, Disposition, GameFlowService, TurnStamp};
use crate::entities::TableDoc;
use crate::error::AppError;
use crate::repos::{games, players, tables};
use crate::store::GameCode;

impl GameFlowService {
    /// Forget the bot claim for `table` if the table has moved past it.
    pub fn release_stale_bot_claim(&self, code: &GameCode, table: &TableDoc) {
        let key = table_key(code, table.id);
        let current = table.current_player();
        self.bot_claims.remove_if(&key, |_, claim| {
            claim.round != table.round
                || claim.turn != table.current_turn
                || Some(claim.player_id.as_str()) != current
        });
    }

    /// Start the bot loop for the table's current turn if the current player
    /// is a bot and no loop has been started for this turn yet.
    ///
    /// Returns whether a loop was spawned.
    pub async fn maybe_spawn_bot_turn(
        self: &Arc<Self>,
        code: &GameCode,
        table: &TableDoc,
    ) -> Result<bool, AppError> {
        if table.round_over || table.player_ids.is_empty() {
            return Ok(false);
        }
        let Some(player_id) = table.current_player() else {
            return Ok(false);
        };

        let game = games::require(self.store(), code).await?;
        if !game.accepts_play() {
            return Ok(false);
        }
        let Some(player) = players::find(self.store(), code, player_id).await? else {
            return Ok(false);
        };
        if !player.is_bot {
            return Ok(false);
        }

        let claim = BotTurnClaim {
            round: table.round,
            turn: table.current_turn,
            player_id: player_id.to_string(),
        };
        let key = table_key(code, table.id);
        let fresh = match self.bot_claims.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(mut e) => {
                if *e.get() == claim {
                    false
                } else {
                    e.insert(claim.clone());
                    true
                }
            }
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(claim.clone());
                true
            }
        };
        if !fresh {
            return Ok(false);
        }

        debug!(game = %code, table_id = table.id, player_id, turn = table.current_turn, "Spawning bot turn");
        let svc = Arc::clone(self);
        let code = code.clone();
        let table_id = table.id;
        let stamp = TurnStamp::of(table);
        tokio::spawn(async move {
            svc.run_bot_turn(code, table_id, stamp, claim).await;
        });
        Ok(true)
    }

    /// Roll until the bot scores nothing (or wipes its team), then end the turn.
    async fn run_bot_turn(
        self: Arc<Self>,
        code: GameCode,
        table_id: u32,
        stamp: TurnStamp,
        claim: BotTurnClaim,
    ) {
        let player_id = claim.player_id.as_str();
        let key = table_key(&code, table_id);

        match self.drive_bot_turn(&code, table_id, stamp, player_id).await {
            Ok(true) => {
                self.bot_claims.remove_if(&key, |_, c| *c == claim);
            }
            Ok(false) => {}
            Err(err) => {
                warn!(game = %code, table_id, player_id, error = %err, "Bot turn failed");
                self.clear_rolling(&code, table_id).await;
                self.bot_claims.remove_if(&key, |_, c| *c == claim);
            }
        }
    }

    /// Returns `Ok(true)` when the turn was handed on.
    async fn drive_bot_turn(
        &self,
        code: &GameCode,
        table_id: u32,
        stamp: TurnStamp,
        player_id: &str,
    ) -> Result<bool, AppError> {
        let timings = self.config.timings.clone();
        let mut rolls = 0u32;

        loop {
            if !self.bot_may_continue(code, table_id, stamp, player_id).await? {
                debug!(game = %code, table_id, player_id, rolls, "Bot turn aborted");
                return Ok(false);
            }

            let outcome = self
                .roll_with_presentation(code, table_id, player_id, timings.bot_roll_presentation)
                .await?;
            let out = match outcome {
                Disposition::Applied(out) => out,
                Disposition::Ignored(reason) => {
                    debug!(game = %code, table_id, player_id, ?reason, "Bot roll ignored, stopping");
                    return Ok(false);
                }
            };
            rolls += 1;

            sleep(timings.bot_result_display).await;

            if out.ended_round {
                info!(game = %code, table_id, player_id, "Bot roll ended the round");
                return Ok(false);
            }
            if !out.score.continues_turn() {
                break;
            }
        }

        sleep(timings.bot_final_pause).await;
        let advanced = self.advance_turn(code, table_id, stamp).await?;
        debug!(game = %code, table_id, player_id, rolls, applied = advanced.is_applied(), "Bot turn finished");
        Ok(advanced.is_applied())
    }

    async fn bot_may_continue(
        &self,
        code: &GameCode,
        table_id: u32,
        stamp: TurnStamp,
        player_id: &str,
    ) -> Result<bool, AppError> {
        let table = tables::require(self.store(), code, table_id).await?;
        let game = games::require(self.store(), code).await?;
        Ok(stamp.matches(&table)
            && table.current_player() == Some(player_id)
            && !table.round_over
            && game.accepts_play())
    }
}
