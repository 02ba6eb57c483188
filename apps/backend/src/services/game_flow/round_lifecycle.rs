use serde_json::json;
use tracing::{debug, info, warn};

use super::GameFlowService;
use crate::domain::rules::SEATS_PER_TABLE;
use crate::domain::seating::HEAD_TABLE;
use crate::domain::{select_winner, Standing, TeamResult};
use crate::entities::games::fields as gf;
use crate::entities::tables::fields as tf;
use crate::entities::{PlayerDoc, WinnerRecord};
use crate::error::AppError;
use crate::repos::{games, players, tables};
use crate::store::{fields, GameCode};
use crate::utils::clock::now_millis;

impl GameFlowService {
    /// End the round everywhere once a head-table team reaches the threshold.
    ///
    /// Idempotent: does nothing when the head table is already over or the
    /// game already signals "next round ready". Returns whether this call
    /// ended the round.
    pub async fn check_head_table_for_round_end(&self, code: &GameCode) -> Result<bool, AppError> {
        let store = self.store();
        let game = games::require(store, code).await?;
        if !game.started || game.game_over || game.next_round_ready {
            return Ok(false);
        }
        let Some(head) = tables::find(store, code, HEAD_TABLE).await? else {
            return Ok(false);
        };
        if head.round_over || head.player_ids.len() != SEATS_PER_TABLE {
            return Ok(false);
        }

        let mut points = [0i64; SEATS_PER_TABLE];
        for (seat, player_id) in head.player_ids.iter().enumerate() {
            if let Some(p) = players::find(store, code, player_id).await? {
                points[seat] = p.points_this_round;
            }
        }
        let result = TeamResult::from_seat_points(points);
        if result.best_total() < self.config.win_threshold {
            return Ok(false);
        }

        info!(
            game = %code,
            round = head.round,
            even = result.totals[0],
            odd = result.totals[1],
            "Head table reached the threshold, ending round"
        );

        for table in tables::list(store, code).await? {
            let update = fields(json!({ tf::ROUND_OVER: true, tf::IS_ROLLING: false }));
            if let Err(err) = tables::update(store, code, table.id, update).await {
                warn!(game = %code, table_id = table.id, error = %err, "Failed to mark table round over");
            }
        }
        games::update(store, code, fields(json!({ gf::NEXT_ROUND_READY: true }))).await?;
        Ok(true)
    }

    /// Record the tournament winner once someone reaches the target rounds.
    ///
    /// Never fires twice: a game already over is left untouched.
    pub async fn check_win_condition(
        &self,
        code: &GameCode,
    ) -> Result<Option<WinnerRecord>, AppError> {
        let store = self.store();
        let game = games::require(store, code).await?;
        if !game.started || game.game_over {
            return Ok(None);
        }

        let players = players::list_valid(store, code).await?;
        let standings: Vec<Standing> = players.iter().map(PlayerDoc::standing).collect();
        let Some(best) = select_winner(&standings, game.target_rounds) else {
            debug!(game = %code, target_rounds = game.target_rounds, "No winner yet");
            return Ok(None);
        };
        let winner = WinnerRecord::from(best);

        games::update(
            store,
            code,
            fields(json!({
                gf::GAME_OVER: true,
                gf::WINNER: winner,
                gf::FINISHED_AT: now_millis(),
            })),
        )
        .await?;
        self.forget_game(code);

        info!(
            game = %code,
            winner = %winner.id,
            rounds_won = winner.rounds_won,
            total_points = winner.total_points,
            "Tournament won"
        );
        Ok(Some(winner))
    }
}
