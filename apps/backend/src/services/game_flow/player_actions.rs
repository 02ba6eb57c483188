use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{table_key, Disposition, GameFlowService, IgnoreReason, RollOutcome, TurnStamp};
use crate::config::TotalPointsMode;
use crate::domain::{score, Dice, RollScore, Team};
use crate::entities::players::fields as pf;
use crate::entities::tables::fields as tf;
use crate::entities::{GameDoc, RollResult, TableDoc};
use crate::error::AppError;
use crate::repos::{games, players, tables};
use crate::store::{fields, GameCode};
use crate::utils::clock::now_millis;

/// Why `player_id` may not roll at `table` right now, if anything.
fn roll_blocker(game: &GameDoc, table: &TableDoc, player_id: &str) -> Option<IgnoreReason> {
    if !game.started {
        return Some(IgnoreReason::GameNotStarted);
    }
    if game.game_over {
        return Some(IgnoreReason::GameOver);
    }
    if game.round_transition_in_progress {
        return Some(IgnoreReason::TransitionInProgress);
    }
    if table.round_over {
        return Some(IgnoreReason::RoundOver);
    }
    if table.current_player() != Some(player_id) {
        return Some(IgnoreReason::NotYourTurn);
    }
    if table.is_rolling {
        return Some(IgnoreReason::RollInFlight);
    }
    // A zero or triple-ones roll ends the turn; only the turn advance clears it.
    let finished = table.last_roll.as_ref().is_some_and(|r| {
        r.player_id.as_deref() == Some(player_id) && (r.points == 0 || r.is_triple_ones)
    });
    if finished {
        return Some(IgnoreReason::TurnFinished);
    }
    None
}

impl GameFlowService {
    /// Roll for the current player (human-triggered).
    ///
    /// After the roll a zero score advances the turn shortly; anything else
    /// arms the end-turn timers.
    pub async fn roll(
        self: &Arc<Self>,
        code: &GameCode,
        table_id: u32,
        player_id: &str,
    ) -> Result<Disposition<RollOutcome>, AppError> {
        let presentation = self.config.timings.roll_presentation;
        let outcome = self
            .roll_with_presentation(code, table_id, player_id, presentation)
            .await?;

        if let Disposition::Applied(out) = &outcome {
            self.schedule_after_human_roll(code, table_id, out);
        }
        Ok(outcome)
    }

    /// Mark the table rolling, wait `presentation`, re-check, then roll.
    pub(super) async fn roll_with_presentation(
        &self,
        code: &GameCode,
        table_id: u32,
        player_id: &str,
        presentation: Duration,
    ) -> Result<Disposition<RollOutcome>, AppError> {
        let store = self.store();
        let table = tables::require(store, code, table_id).await?;
        let game = games::require(store, code).await?;

        if let Some(reason) = roll_blocker(&game, &table, player_id) {
            debug!(game = %code, table_id, player_id, ?reason, "Roll ignored");
            return Ok(Disposition::Ignored(reason));
        }

        let key = table_key(code, table_id);
        if !self.rolls_in_flight.insert(key.clone()) {
            return Ok(Disposition::Ignored(IgnoreReason::RollInFlight));
        }
        let result = self
            .roll_claimed(code, &table, player_id, presentation)
            .await;
        self.rolls_in_flight.remove(&key);
        result
    }

    async fn roll_claimed(
        &self,
        code: &GameCode,
        table: &TableDoc,
        player_id: &str,
        presentation: Duration,
    ) -> Result<Disposition<RollOutcome>, AppError> {
        let store = self.store();
        let stamp = TurnStamp::of(table);
        self.timers.cancel(&table_key(code, table.id));

        tables::update(
            store,
            code,
            table.id,
            fields(json!({
                tf::IS_ROLLING: true,
                tf::CAN_END_TURN: false,
                tf::TURN_START: now_millis(),
            })),
        )
        .await?;

        sleep(presentation).await;

        // The table or the match may have moved on while the dice were "in the air".
        let table = tables::require(store, code, table.id).await?;
        let game = games::require(store, code).await?;
        let still_valid = stamp.matches(&table)
            && table.current_player() == Some(player_id)
            && !table.round_over
            && game.accepts_play();
        if !still_valid {
            debug!(game = %code, table_id = table.id, player_id, "Roll abandoned after presentation delay");
            // Rolls on one table are serialised by `rolls_in_flight`, so a set
            // flag here is ours even if a transition reset the table under us.
            if table.is_rolling {
                self.clear_rolling(code, table.id).await;
            }
            return Ok(Disposition::Ignored(IgnoreReason::Stale));
        }

        match self.apply_roll(code, &table, player_id).await {
            Ok((dice, score, ended_round)) => Ok(Disposition::Applied(RollOutcome {
                dice,
                score,
                ended_round,
                stamp,
            })),
            Err(err) => {
                self.clear_rolling(code, table.id).await;
                Err(err)
            }
        }
    }

    /// Draw dice, persist them, credit the roller and run the round-end check.
    async fn apply_roll(
        &self,
        code: &GameCode,
        table: &TableDoc,
        player_id: &str,
    ) -> Result<(Dice, RollScore, bool), AppError> {
        let store = self.store();
        let dice = self.dice.roll();
        let score = score(dice, table.target());
        let now = now_millis();

        tables::update(
            store,
            code,
            table.id,
            fields(json!({
                tf::DICE: dice,
                tf::LAST_ROLL: RollResult::new(score, player_id, now),
                tf::IS_ROLLING: false,
                tf::TURN_START: now,
            })),
        )
        .await?;

        debug!(
            game = %code,
            table_id = table.id,
            player_id,
            ?dice,
            points = score.points,
            bunco = score.is_bunco,
            triple_ones = score.is_triple_ones,
            "Roll applied"
        );

        if score.is_triple_ones {
            let team = table
                .seat_of(player_id)
                .map(Team::of_seat)
                .unwrap_or(Team::Even);
            for member in table.team_members(team) {
                let reset = fields(json!({ pf::POINTS_THIS_ROUND: 0 }));
                if let Err(err) = players::update(store, code, member, reset).await {
                    warn!(game = %code, player_id = member, error = %err, "Failed to reset team points after triple ones");
                }
            }
        } else if score.points > 0 {
            self.credit(code, player_id, pf::POINTS_THIS_ROUND, score.points)
                .await;
            if self.config.total_points_mode == TotalPointsMode::PerRoll {
                self.credit(code, player_id, pf::TOTAL_POINTS, score.points)
                    .await;
            }
            if score.is_bunco {
                self.credit(code, player_id, pf::BUNCO_COUNT, 1).await;
            }
        }

        let ended_round = if table.is_head() {
            match self.check_head_table_for_round_end(code).await {
                Ok(ended) => ended,
                Err(err) => {
                    warn!(game = %code, error = %err, "Round-end check after roll failed");
                    false
                }
            }
        } else {
            false
        };

        Ok((dice, score, ended_round))
    }

    async fn credit(&self, code: &GameCode, player_id: &str, field: &str, delta: i64) {
        if let Err(err) = players::increment(self.store(), code, player_id, field, delta).await {
            warn!(game = %code, player_id, field, error = %err, "Failed to credit player");
        }
    }

    pub(super) async fn clear_rolling(&self, code: &GameCode, table_id: u32) {
        let update = fields(json!({ tf::IS_ROLLING: false }));
        if let Err(err) = tables::update(self.store(), code, table_id, update).await {
            warn!(game = %code, table_id, error = %err, "Failed to clear rolling flag");
        }
    }

    /// End the current player's turn once it has become endable.
    pub async fn end_turn(
        &self,
        code: &GameCode,
        table_id: u32,
        player_id: &str,
    ) -> Result<Disposition, AppError> {
        let table = tables::require(self.store(), code, table_id).await?;
        if table.current_player() != Some(player_id) {
            return Ok(Disposition::Ignored(IgnoreReason::NotYourTurn));
        }
        if table.is_rolling {
            return Ok(Disposition::Ignored(IgnoreReason::RollInFlight));
        }
        if !table.can_end_turn {
            return Ok(Disposition::Ignored(IgnoreReason::NotEndable));
        }
        self.advance_turn(code, table_id, TurnStamp::of(&table))
            .await
    }

    /// Pass the turn to the next seat, provided the table is still on `stamp`.
    pub async fn advance_turn(
        &self,
        code: &GameCode,
        table_id: u32,
        stamp: TurnStamp,
    ) -> Result<Disposition, AppError> {
        let table = tables::require(self.store(), code, table_id).await?;
        if !stamp.matches(&table) {
            debug!(game = %code, table_id, ?stamp, "Stale turn advance ignored");
            return Ok(Disposition::Ignored(IgnoreReason::Stale));
        }
        if table.round_over {
            return Ok(Disposition::Ignored(IgnoreReason::RoundOver));
        }

        self.timers.cancel(&table_key(code, table_id));
        let next = table.next_turn();
        tables::update(
            self.store(),
            code,
            table_id,
            fields(json!({
                tf::CURRENT_TURN: next,
                tf::TURN_START: now_millis(),
                tf::LAST_ROLL: null,
                tf::CAN_END_TURN: false,
                tf::IS_ROLLING: false,
            })),
        )
        .await?;

        debug!(game = %code, table_id, from = stamp.turn, to = next, "Turn advanced");
        Ok(Disposition::Applied(()))
    }

    fn schedule_after_human_roll(self: &Arc<Self>, code: &GameCode, table_id: u32, out: &RollOutcome) {
        if out.ended_round {
            return;
        }
        if out.score.points == 0 && !out.score.is_triple_ones {
            self.schedule_zero_roll_advance(code.clone(), table_id, out.stamp);
        } else {
            self.schedule_end_turn_timers(code.clone(), table_id, out.stamp);
        }
    }

    fn schedule_zero_roll_advance(self: &Arc<Self>, code: GameCode, table_id: u32, stamp: TurnStamp) {
        let token = self.timers.arm(table_key(&code, table_id));
        let delay = self.config.timings.zero_roll_advance;
        let svc = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = sleep(delay) => {}
            }
            if let Err(err) = svc.advance_turn(&code, table_id, stamp).await {
                warn!(game = %code, table_id, error = %err, "Zero-roll advance failed");
            }
        });
    }

    /// Make the turn endable after a delay, then end it if the player stalls.
    fn schedule_end_turn_timers(self: &Arc<Self>, code: GameCode, table_id: u32, stamp: TurnStamp) {
        let token = self.timers.arm(table_key(&code, table_id));
        let enable_after = self.config.timings.end_turn_enable_delay;
        let auto_end_after = self.config.timings.auto_end_turn_timeout;
        let svc = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = sleep(enable_after) => {}
            }
            match svc.mark_endable(&code, table_id, stamp).await {
                Ok(true) => {}
                Ok(false) => return,
                Err(err) => {
                    warn!(game = %code, table_id, error = %err, "Failed to make turn endable");
                    return;
                }
            }

            tokio::select! {
                _ = token.cancelled() => return,
                _ = sleep(auto_end_after) => {}
            }
            debug!(game = %code, table_id, ?stamp, "Player idle, ending turn automatically");
            if let Err(err) = svc.advance_turn(&code, table_id, stamp).await {
                warn!(game = %code, table_id, error = %err, "Automatic end turn failed");
            }
        });
    }

    async fn mark_endable(
        &self,
        code: &GameCode,
        table_id: u32,
        stamp: TurnStamp,
    ) -> Result<bool, AppError> {
        let table = tables::require(self.store(), code, table_id).await?;
        if !stamp.matches(&table) || table.round_over || table.is_rolling {
            return Ok(false);
        }
        tables::update(
            self.store(),
            code,
            table_id,
            fields(json!({ tf::CAN_END_TURN: true })),
        )
        .await?;
        Ok(true)
    }
}
