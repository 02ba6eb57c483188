//! Match start: pad the lobby with bots, shuffle, and seat everyone.

use serde_json::json;
use tracing::info;
use ulid::Ulid;

use super::GameFlowService;
use crate::domain::lineup::{deal_tables, pad_with_bots, Entrant};
use crate::entities::games::fields as gf;
use crate::entities::{GameDoc, PlayerDoc, TableDoc};
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::repos::{games, players, tables};
use crate::store::{fields, GameCode};
use crate::utils::clock::now_millis;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStart {
    pub tables: usize,
    /// Players who were in the lobby.
    pub joined: usize,
    /// Bots added to fill the tables.
    pub bots_added: usize,
    pub target_rounds: u32,
}

/// Short random suffix that keeps bot ids unique across matches.
fn bot_suffix() -> String {
    let id = Ulid::new().to_string().to_lowercase();
    id[id.len() - 6..].to_string()
}

impl GameFlowService {
    /// Seat the joined players (plus bots) at tables of four and start the match.
    pub async fn start_match(&self, code: &GameCode) -> Result<MatchStart, AppError> {
        let store = self.store();
        let game_path = code.doc();
        let raw = store.get(&game_path).await?;

        let explicit_target = raw
            .as_ref()
            .is_some_and(|doc| doc.contains_key(gf::TARGET_ROUNDS));
        let game: Option<GameDoc> = raw
            .map(|doc| games::from_snapshot(&game_path, doc))
            .transpose()?;
        let target_rounds = match &game {
            Some(g) if explicit_target => g.target_rounds,
            _ => self.config.default_target_rounds,
        };
        if game.as_ref().is_some_and(|g| g.started) {
            return Err(DomainError::validation(
                ValidationKind::AlreadyStarted,
                format!("game {code} has already started"),
            )
            .into());
        }

        let joined = players::list(store, code).await?;
        let joined_count = joined.len();
        let entrants: Vec<Entrant> = joined
            .iter()
            .map(|p| Entrant {
                id: p.id.clone(),
                name: p.name.clone(),
                is_bot: p.is_bot,
            })
            .collect();

        let padded = pad_with_bots(entrants, &bot_suffix());
        let bots_added = padded.len() - joined_count;
        let dealt = {
            let mut rng = self.lineup_rng.lock();
            deal_tables(padded, &mut *rng)
        };

        let now = now_millis();
        for (table_idx, group) in dealt.iter().enumerate() {
            let table_id = table_idx as u32;
            for (seat, entrant) in group.iter().enumerate() {
                let mut player = joined
                    .iter()
                    .find(|p| p.id == entrant.id)
                    .cloned()
                    .unwrap_or_else(|| PlayerDoc::new(&entrant.id, &entrant.name, entrant.is_bot));
                player.table = Some(table_id);
                player.seat = Some(seat as u8);
                player.points_this_round = 0;
                player.total_points = 0;
                player.bunco_count = 0;
                player.rounds_won = 0;
                players::put(store, code, &player).await?;
            }

            let ids = group.iter().map(|e| e.id.clone()).collect();
            tables::put(store, code, &TableDoc::new(table_id, ids, now)).await?;
        }

        games::update(
            store,
            code,
            fields(json!({
                gf::STARTED: true,
                gf::TARGET_ROUNDS: target_rounds,
                gf::GAME_OVER: false,
                gf::NEXT_ROUND_READY: false,
                gf::ROUND_TRANSITION_IN_PROGRESS: false,
                gf::ROUNDS_COMPLETED: 0,
            })),
        )
        .await?;

        info!(
            game = %code,
            tables = dealt.len(),
            joined = joined_count,
            bots_added,
            target_rounds,
            "Match started"
        );

        Ok(MatchStart {
            tables: dealt.len(),
            joined: joined_count,
            bots_added,
            target_rounds,
        })
    }
}
