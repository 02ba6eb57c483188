use serde::{Deserialize, Serialize};

use super::dice::Dice;
use super::rules::{BUNCO_POINTS, TRIPLE_POINTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollScore {
    pub points: i64,
    pub is_bunco: bool,
    pub is_triple_ones: bool,
}

impl RollScore {
    /// A roll that keeps the roller's turn going.
    pub fn continues_turn(&self) -> bool {
        self.points > 0 && !self.is_triple_ones
    }
}

/// Score three dice against the round's target face.
///
/// A triple of the target is a bunco. Triple ones off-target wipe the
/// roller's team (applied by the caller). Any other triple is worth 15.
/// Otherwise each die showing the target is worth one point.
pub fn score(dice: Dice, target: u8) -> RollScore {
    let [a, b, c] = dice;
    if a == b && b == c {
        if a == target {
            return RollScore {
                points: BUNCO_POINTS,
                is_bunco: true,
                is_triple_ones: false,
            };
        }
        if a == 1 {
            return RollScore {
                points: 0,
                is_bunco: false,
                is_triple_ones: true,
            };
        }
        return RollScore {
            points: TRIPLE_POINTS,
            is_bunco: false,
            is_triple_ones: false,
        };
    }

    let matches = dice.iter().filter(|&&d| d == target).count() as i64;
    RollScore {
        points: matches,
        is_bunco: false,
        is_triple_ones: false,
    }
}
