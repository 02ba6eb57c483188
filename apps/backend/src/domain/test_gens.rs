// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::dice::Dice;
use crate::domain::seating::TableOutcome;

pub fn face() -> impl Strategy<Value = u8> {
    1u8..=6
}

pub fn dice() -> impl Strategy<Value = Dice> {
    [face(), face(), face()]
}

/// Rounds cycle 1..=6.
pub fn round() -> impl Strategy<Value = u8> {
    1u8..=6
}

/// A match of `2..=6` tables with distinct player ids and arbitrary round points.
pub fn table_outcomes() -> impl Strategy<Value = Vec<TableOutcome>> {
    (2usize..=6).prop_flat_map(|tables| {
        proptest::collection::vec(proptest::array::uniform4(0i64..=30), tables).prop_map(
            |points| {
                points
                    .into_iter()
                    .enumerate()
                    .map(|(t, points)| TableOutcome {
                        table_id: t as u32,
                        player_ids: std::array::from_fn(|s| format!("p{}", t * 4 + s)),
                        points,
                    })
                    .collect()
            },
        )
    })
}
