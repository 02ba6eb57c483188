//! Tournament results: winner selection, standings and awards.

use serde::Serialize;

/// A player's match totals, independent of how they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub player_id: String,
    pub name: String,
    pub is_bot: bool,
    pub rounds_won: u32,
    pub bunco_count: u32,
    pub total_points: i64,
}

/// Among players at or above `target_rounds`, the one with the most points.
/// Earlier entries win ties.
pub fn select_winner(players: &[Standing], target_rounds: u32) -> Option<&Standing> {
    let mut best: Option<&Standing> = None;
    for p in players.iter().filter(|p| p.rounds_won >= target_rounds) {
        match best {
            Some(b) if p.total_points <= b.total_points => {}
            _ => best = Some(p),
        }
    }
    best
}

/// Ordered by rounds won, then buncos, then total points, all descending.
pub fn standings(players: &[Standing]) -> Vec<Standing> {
    let mut ordered = players.to_vec();
    ordered.sort_by(|a, b| {
        b.rounds_won
            .cmp(&a.rounds_won)
            .then(b.bunco_count.cmp(&a.bunco_count))
            .then(b.total_points.cmp(&a.total_points))
    });
    ordered
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Awards {
    pub most_buncos: Vec<Standing>,
    pub most_points: Vec<Standing>,
}

const AWARD_PLACES: usize = 3;

pub fn awards(players: &[Standing]) -> Awards {
    let mut by_buncos = players.to_vec();
    by_buncos.sort_by(|a, b| b.bunco_count.cmp(&a.bunco_count));
    by_buncos.truncate(AWARD_PLACES);

    let mut by_points = players.to_vec();
    by_points.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    by_points.truncate(AWARD_PLACES);

    Awards {
        most_buncos: by_buncos,
        most_points: by_points,
    }
}
