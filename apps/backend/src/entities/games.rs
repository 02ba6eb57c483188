use serde::{Deserialize, Serialize};

use crate::domain::rules::DEFAULT_TARGET_ROUNDS;
use crate::domain::Standing;
use crate::errors::domain::DomainError;

/// Match-wide state at `games/{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDoc {
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default = "default_target_rounds")]
    pub target_rounds: u32,
    #[serde(default)]
    pub next_round_ready: bool,
    #[serde(default)]
    pub round_transition_in_progress: bool,
    #[serde(default)]
    pub rounds_completed: u32,
    #[serde(default)]
    pub winner: Option<WinnerRecord>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub finished_at: Option<i64>,
}

fn default_target_rounds() -> u32 {
    DEFAULT_TARGET_ROUNDS
}

impl Default for GameDoc {
    fn default() -> Self {
        Self {
            started: false,
            game_over: false,
            target_rounds: DEFAULT_TARGET_ROUNDS,
            next_round_ready: false,
            round_transition_in_progress: false,
            rounds_completed: 0,
            winner: None,
            finished_at: None,
        }
    }
}

impl GameDoc {
    /// Turn-level play is allowed: started, not over, not between rounds.
    pub fn accepts_play(&self) -> bool {
        self.started && !self.game_over && !self.round_transition_in_progress
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.target_rounds == 0 {
            return Err(DomainError::malformed("targetRounds must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerRecord {
    pub id: String,
    pub name: String,
    pub rounds_won: u32,
    pub total_points: i64,
}

impl From<&Standing> for WinnerRecord {
    fn from(s: &Standing) -> Self {
        Self {
            id: s.player_id.clone(),
            name: s.name.clone(),
            rounds_won: s.rounds_won,
            total_points: s.total_points,
        }
    }
}

pub mod fields {
    pub const STARTED: &str = "started";
    pub const GAME_OVER: &str = "gameOver";
    pub const TARGET_ROUNDS: &str = "targetRounds";
    pub const NEXT_ROUND_READY: &str = "nextRoundReady";
    pub const ROUND_TRANSITION_IN_PROGRESS: &str = "roundTransitionInProgress";
    pub const ROUNDS_COMPLETED: &str = "roundsCompleted";
    pub const WINNER: &str = "winner";
    pub const FINISHED_AT: &str = "finishedAt";
}
