//! Initial seating at match start.

use rand::seq::SliceRandom;
use rand::Rng;

use super::rules::{lineup_size, SEATS_PER_TABLE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    pub id: String,
    pub name: String,
    pub is_bot: bool,
}

impl Entrant {
    pub fn human(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_bot: false,
        }
    }

    /// Bot number `index` (zero-based); `unique` keeps ids distinct across matches.
    pub fn bot(index: usize, unique: &str) -> Self {
        Self {
            id: format!("bot-{index}-{unique}"),
            name: format!("Bot {}", index + 1),
            is_bot: true,
        }
    }
}

/// Append bots until the lineup fills whole tables and has at least eight players.
pub fn pad_with_bots(mut entrants: Vec<Entrant>, unique: &str) -> Vec<Entrant> {
    let target = lineup_size(entrants.len());
    let shortfall = target - entrants.len();
    entrants.extend((0..shortfall).map(|i| Entrant::bot(i, unique)));
    entrants
}

/// Shuffle and split into tables of four. Table index = position, seat = slot.
pub fn deal_tables<R: Rng + ?Sized>(mut entrants: Vec<Entrant>, rng: &mut R) -> Vec<Vec<Entrant>> {
    entrants.shuffle(rng);
    entrants
        .chunks(SEATS_PER_TABLE)
        .map(<[Entrant]>::to_vec)
        .collect()
}
