//! Read-side helpers for finished (or running) matches.

use serde::Serialize;

use crate::domain::{awards, standings, Awards, Standing};
use crate::entities::WinnerRecord;
use crate::error::AppError;
use crate::repos::{games, players};
use crate::store::{DocumentStore, GameCode};

/// Everything a results screen needs, computed from the stored documents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResults {
    pub game_over: bool,
    pub rounds_completed: u32,
    pub winner: Option<WinnerRecord>,
    pub finished_at: Option<i64>,
    pub standings: Vec<Standing>,
    pub awards: Awards,
}

pub async fn load_standings(
    store: &dyn DocumentStore,
    code: &GameCode,
) -> Result<Vec<Standing>, AppError> {
    let roster: Vec<Standing> = players::list_valid(store, code)
        .await?
        .iter()
        .map(|p| p.standing())
        .collect();
    Ok(standings(&roster))
}

pub async fn load_results(
    store: &dyn DocumentStore,
    code: &GameCode,
) -> Result<MatchResults, AppError> {
    let game = games::require(store, code).await?;
    let ordered = load_standings(store, code).await?;
    Ok(MatchResults {
        game_over: game.game_over,
        rounds_completed: game.rounds_completed,
        winner: game.winner,
        finished_at: game.finished_at,
        awards: awards(&ordered),
        standings: ordered,
    })
}
