use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::dice::{Dice, RESTING_DICE};
use crate::domain::rules::{round_target, DIE_FACES, SEATS_PER_TABLE};
use crate::domain::{RollScore, Team};
use crate::errors::domain::DomainError;

/// One table at `games/{code}/tables/{id}`. Table 0 is the head table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDoc {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub player_ids: Vec<String>,
    #[serde(default)]
    pub current_turn: usize,
    #[serde(default = "resting_dice")]
    pub dice: Dice,
    #[serde(default = "first_round")]
    pub round: u8,
    #[serde(default)]
    pub is_rolling: bool,
    #[serde(default)]
    pub last_roll: Option<RollResult>,
    #[serde(default)]
    pub round_over: bool,
    /// Epoch milliseconds when the current turn (or roll) started.
    #[serde(default)]
    pub turn_start: Option<i64>,
    #[serde(default)]
    pub can_end_turn: bool,
}

fn resting_dice() -> Dice {
    RESTING_DICE
}

fn first_round() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    pub points: i64,
    pub is_bunco: bool,
    pub is_triple_ones: bool,
    pub timestamp: i64,
    #[serde(default)]
    pub player_id: Option<String>,
}

impl RollResult {
    pub fn new(score: RollScore, player_id: &str, timestamp: i64) -> Self {
        Self {
            points: score.points,
            is_bunco: score.is_bunco,
            is_triple_ones: score.is_triple_ones,
            timestamp,
            player_id: Some(player_id.to_string()),
        }
    }
}

impl TableDoc {
    pub fn new(id: u32, player_ids: Vec<String>, now: i64) -> Self {
        Self {
            id,
            player_ids,
            current_turn: 0,
            dice: RESTING_DICE,
            round: 1,
            is_rolling: false,
            last_roll: None,
            round_over: false,
            turn_start: Some(now),
            can_end_turn: false,
        }
    }

    pub fn is_head(&self) -> bool {
        self.id == 0
    }

    pub fn target(&self) -> u8 {
        round_target(self.round)
    }

    pub fn current_player(&self) -> Option<&str> {
        self.player_ids.get(self.current_turn).map(String::as_str)
    }

    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.player_ids.iter().position(|id| id == player_id)
    }

    /// Ids on `team`, in seat order.
    pub fn team_members(&self, team: Team) -> Vec<&str> {
        team.seats()
            .filter_map(|s| self.player_ids.get(s).map(String::as_str))
            .collect()
    }

    pub fn next_turn(&self) -> usize {
        (self.current_turn + 1) % SEATS_PER_TABLE
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.player_ids.is_empty() {
            if self.player_ids.len() != SEATS_PER_TABLE {
                return Err(DomainError::malformed(format!(
                    "table {} has {} players",
                    self.id,
                    self.player_ids.len()
                )));
            }
            let distinct: HashSet<&String> = self.player_ids.iter().collect();
            if distinct.len() != SEATS_PER_TABLE {
                return Err(DomainError::malformed(format!(
                    "table {} seats a player twice",
                    self.id
                )));
            }
            if self.current_turn >= SEATS_PER_TABLE {
                return Err(DomainError::malformed(format!(
                    "table {} has turn index {}",
                    self.id, self.current_turn
                )));
            }
        }
        if self.dice.iter().any(|d| !(1..=DIE_FACES).contains(d)) {
            return Err(DomainError::malformed(format!(
                "table {} shows dice {:?}",
                self.id, self.dice
            )));
        }
        if !(1..=DIE_FACES).contains(&self.round) {
            return Err(DomainError::malformed(format!(
                "table {} is in round {}",
                self.id, self.round
            )));
        }
        Ok(())
    }
}

pub mod fields {
    pub const PLAYER_IDS: &str = "playerIds";
    pub const CURRENT_TURN: &str = "currentTurn";
    pub const DICE: &str = "dice";
    pub const ROUND: &str = "round";
    pub const IS_ROLLING: &str = "isRolling";
    pub const LAST_ROLL: &str = "lastRoll";
    pub const ROUND_OVER: &str = "roundOver";
    pub const TURN_START: &str = "turnStart";
    pub const CAN_END_TURN: &str = "canEndTurn";
}
