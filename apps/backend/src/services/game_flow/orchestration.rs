use std::collections::HashMap;

use serde_json::json;
use tracing::{error, info, warn};

use super::{Disposition, GameFlowService, IgnoreReason};
use crate::config::TotalPointsMode;
use crate::domain::dice::RESTING_DICE;
use crate::domain::rules::SEATS_PER_TABLE;
use crate::domain::{next_round, plan_next_seating, TableOutcome, TeamResult};
use crate::entities::games::fields as gf;
use crate::entities::players::fields as pf;
use crate::entities::tables::fields as tf;
use crate::entities::{PlayerDoc, WinnerRecord};
use crate::error::AppError;
use crate::repos::{games, players, tables};
use crate::store::{fields, GameCode};
use crate::utils::clock::now_millis;

/// What a completed round transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReport {
    pub results: Vec<(u32, TeamResult)>,
    pub winners: Vec<String>,
    pub next_round: u8,
    pub seating_attempts: u32,
    /// Seating problems left over after the retry bound (normally empty).
    pub violations: Vec<String>,
    /// Paths whose write failed and were skipped.
    pub failed_writes: Vec<String>,
    pub tournament_winner: Option<WinnerRecord>,
}

impl GameFlowService {
    /// Move every table to the next round: credit winners, re-seat everyone,
    /// reset the tables, then re-run the win check.
    ///
    /// Ignored unless "next round ready" is set and no other transition is
    /// running. The in-progress flag is always cleared at the end, even when
    /// the body fails.
    pub async fn transition_to_next_round(
        &self,
        code: &GameCode,
    ) -> Result<Disposition<TransitionReport>, AppError> {
        let store = self.store();
        let game = games::require(store, code).await?;
        if game.game_over {
            return Ok(Disposition::Ignored(IgnoreReason::GameOver));
        }
        if !game.next_round_ready {
            return Ok(Disposition::Ignored(IgnoreReason::NotReady));
        }
        if game.round_transition_in_progress {
            return Ok(Disposition::Ignored(IgnoreReason::TransitionInProgress));
        }

        games::update(
            store,
            code,
            fields(json!({ gf::ROUND_TRANSITION_IN_PROGRESS: true })),
        )
        .await?;

        let result = self.run_transition(code).await;

        let mut clear = fields(json!({ gf::ROUND_TRANSITION_IN_PROGRESS: false }));
        if matches!(result, Ok(Disposition::Applied(_))) {
            clear.insert(gf::NEXT_ROUND_READY.to_string(), json!(false));
        }
        if let Err(err) = games::update(store, code, clear).await {
            error!(game = %code, error = %err, "Failed to clear round transition flags");
        }

        let mut report = match result {
            Ok(Disposition::Applied(report)) => report,
            Ok(ignored) => return Ok(ignored),
            Err(err) => {
                error!(game = %code, error = %err, "Round transition failed");
                return Err(err);
            }
        };

        if let Err(err) = games::increment(store, code, gf::ROUNDS_COMPLETED, 1).await {
            warn!(game = %code, error = %err, "Failed to count completed round");
        }

        report.tournament_winner = self.check_win_condition(code).await?;
        Ok(Disposition::Applied(report))
    }

    async fn run_transition(&self, code: &GameCode) -> Result<Disposition<TransitionReport>, AppError> {
        let store = self.store();
        let all_players = players::list_valid(store, code).await?;
        let all_tables = tables::list(store, code).await?;

        // A trigger that raced with another transition finds the flag already cleared.
        let game = games::require(store, code).await?;
        if !game.next_round_ready {
            return Ok(Disposition::Ignored(IgnoreReason::Stale));
        }

        let by_id: HashMap<&str, &PlayerDoc> =
            all_players.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut outcomes = Vec::with_capacity(all_tables.len());
        let mut current_round = 1;
        for table in &all_tables {
            let Ok(player_ids) = <[String; SEATS_PER_TABLE]>::try_from(table.player_ids.clone())
            else {
                warn!(game = %code, table_id = table.id, "Skipping table without a full lineup");
                continue;
            };
            let points = std::array::from_fn(|seat| {
                by_id
                    .get(player_ids[seat].as_str())
                    .map(|p| p.points_this_round)
                    .unwrap_or(0)
            });
            current_round = table.round;
            outcomes.push(TableOutcome {
                table_id: table.id,
                player_ids,
                points,
            });
        }
        let upcoming = next_round(current_round);

        let plan = {
            let mut rng = self.seating_rng.lock();
            plan_next_seating(&outcomes, self.config.seating_retry_limit, &mut *rng)
        };
        let seating = &plan.seating;
        if !seating.satisfied() {
            warn!(
                game = %code,
                attempts = seating.attempts,
                violations = ?seating.violations,
                "Seating constraints unsatisfied after retries, using best attempt"
            );
        }

        let placements: HashMap<&str, (u32, u8)> = seating
            .value
            .placements()
            .map(|(id, table, seat)| (id, (table, seat)))
            .collect();

        let mut failed_writes = Vec::new();

        for player in &all_players {
            let won = plan.movement.is_winner(&player.id);
            let mut update = fields(json!({
                pf::POINTS_THIS_ROUND: 0,
                pf::ROUNDS_WON: player.rounds_won + u32::from(won),
            }));
            if self.config.total_points_mode == TotalPointsMode::AtRoundEnd {
                update.insert(
                    pf::TOTAL_POINTS.to_string(),
                    json!(player.total_points + player.points_this_round),
                );
            }
            if let Some((table, seat)) = placements.get(player.id.as_str()) {
                update.insert(pf::TABLE.to_string(), json!(table));
                update.insert(pf::SEAT.to_string(), json!(seat));
            }
            if let Err(err) = players::update(store, code, &player.id, update).await {
                warn!(game = %code, player_id = %player.id, error = %err, "Failed to update player, skipping");
                failed_writes.push(code.player(&player.id).to_string());
            }
        }

        let now = now_millis();
        for table in &seating.value.tables {
            let update = fields(json!({
                tf::PLAYER_IDS: table.player_ids(),
                tf::CURRENT_TURN: 0,
                tf::DICE: RESTING_DICE,
                tf::ROUND: upcoming,
                tf::ROUND_OVER: false,
                tf::IS_ROLLING: false,
                tf::LAST_ROLL: null,
                tf::CAN_END_TURN: false,
                tf::TURN_START: now,
            }));
            if let Err(err) = tables::update(store, code, table.table_id, update).await {
                warn!(game = %code, table_id = table.table_id, error = %err, "Failed to reset table, skipping");
                failed_writes.push(code.table(table.table_id).to_string());
            }
        }

        info!(
            game = %code,
            next_round = upcoming,
            tables = outcomes.len(),
            attempts = seating.attempts,
            failed_writes = failed_writes.len(),
            "Round transition complete"
        );

        Ok(Disposition::Applied(TransitionReport {
            results: plan.movement.results.clone(),
            winners: plan.movement.winners.clone(),
            next_round: upcoming,
            seating_attempts: seating.attempts,
            violations: seating.violations.iter().map(ToString::to_string).collect(),
            failed_writes,
            tournament_winner: None,
        }))
    }
}
