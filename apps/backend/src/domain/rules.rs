pub const SEATS_PER_TABLE: usize = 4;
pub const MIN_PLAYERS: usize = 8;
pub const DIE_FACES: u8 = 6;

pub const BUNCO_POINTS: i64 = 21;
pub const TRIPLE_POINTS: i64 = 15;

/// Head-table team total that ends the round for every table.
pub const WIN_THRESHOLD: i64 = 21;
pub const DEFAULT_TARGET_ROUNDS: u32 = 6;

/// Rounds cycle 1..=6 and the target face follows the round number.
pub fn round_target(round: u8) -> u8 {
    (round.max(1) - 1) % DIE_FACES + 1
}

pub fn next_round(round: u8) -> u8 {
    round % DIE_FACES + 1
}

/// Match size after bot padding: a multiple of four, never below eight.
pub fn lineup_size(joined: usize) -> usize {
    let rounded = joined.div_ceil(SEATS_PER_TABLE) * SEATS_PER_TABLE;
    rounded.max(MIN_PLAYERS)
}
