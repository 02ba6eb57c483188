use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::rules::SEATS_PER_TABLE;
use crate::domain::Standing;
use crate::errors::domain::{DomainError, ValidationKind};

/// A participant at `games/{code}/players/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDoc {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default, deserialize_with = "unassigned_if_negative")]
    pub table: Option<u32>,
    #[serde(default, deserialize_with = "unassigned_if_negative")]
    pub seat: Option<u8>,
    #[serde(default)]
    pub points_this_round: i64,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub bunco_count: u32,
    #[serde(default)]
    pub rounds_won: u32,
}

/// Lobby clients mark "no seat" as -1; treat any negative number as unassigned.
fn unassigned_if_negative<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(n) if n < 0 => Ok(None),
        Some(n) => T::try_from(n)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("{n} is out of range"))),
    }
}

impl PlayerDoc {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_bot: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_bot,
            is_host: false,
            table: None,
            seat: None,
            points_this_round: 0,
            total_points: 0,
            bunco_count: 0,
            rounds_won: 0,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match (self.table, self.seat) {
            (None, None) => Ok(()),
            (Some(_), Some(seat)) if (seat as usize) < SEATS_PER_TABLE => Ok(()),
            (Some(_), Some(seat)) => Err(DomainError::validation(
                ValidationKind::InvalidSeat,
                format!("player {} has seat {seat}", self.id),
            )),
            _ => Err(DomainError::malformed(format!(
                "player {} has only one of table/seat assigned",
                self.id
            ))),
        }
    }

    pub fn standing(&self) -> Standing {
        Standing {
            player_id: self.id.clone(),
            name: self.name.clone(),
            is_bot: self.is_bot,
            rounds_won: self.rounds_won,
            bunco_count: self.bunco_count,
            total_points: self.total_points,
        }
    }
}

pub mod fields {
    pub const TABLE: &str = "table";
    pub const SEAT: &str = "seat";
    pub const POINTS_THIS_ROUND: &str = "pointsThisRound";
    pub const TOTAL_POINTS: &str = "totalPoints";
    pub const BUNCO_COUNT: &str = "buncoCount";
    pub const ROUNDS_WON: &str = "roundsWon";
}
