//! Per-tournament metrics written by the simulator.

use bunco_backend::domain::{Awards, Standing};
use bunco_backend::entities::WinnerRecord;
use serde::Serialize;

use crate::simulator::TournamentResult;

#[derive(Debug, Clone, Serialize)]
pub struct TournamentMetrics {
    pub tournament_id: u32,
    pub code: String,
    pub seed: u64,
    pub timestamp: String,
    pub config: TournamentConfig,
    pub result: TournamentResultMetrics,
    pub standings: Vec<Standing>,
    pub awards: Awards,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentConfig {
    pub players: usize,
    pub bots_added: usize,
    pub tables: usize,
    pub target_rounds: u32,
    pub total_tournaments: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentResultMetrics {
    pub winner: Option<WinnerRecord>,
    pub rounds_played: u32,
    pub total_buncos: u32,
    pub timed_out: bool,
    pub duration_ms: f64,
}

pub fn build_tournament_metrics(
    tournament_id: u32,
    total_tournaments: u32,
    result: &TournamentResult,
    duration_ms: f64,
) -> TournamentMetrics {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());
    let total_buncos = result.results.standings.iter().map(|s| s.bunco_count).sum();

    TournamentMetrics {
        tournament_id,
        code: result.code.clone(),
        seed: result.seed,
        timestamp,
        config: TournamentConfig {
            players: result.start.joined + result.start.bots_added,
            bots_added: result.start.bots_added,
            tables: result.start.tables,
            target_rounds: result.start.target_rounds,
            total_tournaments,
        },
        result: TournamentResultMetrics {
            winner: result.results.winner.clone(),
            rounds_played: result.results.rounds_completed,
            total_buncos,
            timed_out: result.timed_out,
            duration_ms,
        },
        standings: result.results.standings.clone(),
        awards: result.results.awards.clone(),
    }
}

/// One CSV row per tournament.
#[derive(Debug, Clone, Serialize)]
pub struct CsvSummaryRow {
    pub tournament_id: u32,
    pub seed: u64,
    pub players: usize,
    pub tables: usize,
    pub rounds_played: u32,
    pub total_buncos: u32,
    pub winner_id: String,
    pub winner_name: String,
    pub winner_rounds_won: u32,
    pub winner_points: i64,
    pub timed_out: bool,
    pub duration_ms: f64,
}

impl From<&TournamentMetrics> for CsvSummaryRow {
    fn from(m: &TournamentMetrics) -> Self {
        let winner = m.result.winner.as_ref();
        Self {
            tournament_id: m.tournament_id,
            seed: m.seed,
            players: m.config.players,
            tables: m.config.tables,
            rounds_played: m.result.rounds_played,
            total_buncos: m.result.total_buncos,
            winner_id: winner.map(|w| w.id.clone()).unwrap_or_default(),
            winner_name: winner.map(|w| w.name.clone()).unwrap_or_default(),
            winner_rounds_won: winner.map(|w| w.rounds_won).unwrap_or(0),
            winner_points: winner.map(|w| w.total_points).unwrap_or(0),
            timed_out: m.result.timed_out,
            duration_ms: m.duration_ms(),
        }
    }
}

impl TournamentMetrics {
    fn duration_ms(&self) -> f64 {
        (self.result.duration_ms * 100.0).round() / 100.0
    }
}
