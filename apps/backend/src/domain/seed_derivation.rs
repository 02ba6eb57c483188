//! RNG seed derivation for reproducible matches.
//!
//! A single configured seed feeds several independent random streams
//! (dice, lineup shuffle, re-seating). Each stream gets its own derived seed
//! so that consuming one never shifts another.

/// Seed for the dice stream.
pub fn derive_dice_seed(base: u64) -> u64 {
    base.wrapping_mul(6364136223846793005).wrapping_add(1)
}

/// Seed for the match-start shuffle.
pub fn derive_lineup_seed(base: u64) -> u64 {
    base.wrapping_mul(6364136223846793005).wrapping_add(2)
}

/// Seed for between-round seat shuffles.
pub fn derive_seating_seed(base: u64) -> u64 {
    base.wrapping_mul(6364136223846793005).wrapping_add(3)
}
