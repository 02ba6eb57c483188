//! Domain layer: pure match rules and helpers, no store access.

pub mod bounded;
pub mod dice;
pub mod lineup;
pub mod rules;
pub mod scoring;
pub mod seating;
pub mod seed_derivation;
pub mod standings;
pub mod teams;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_props_seating;
#[cfg(test)]
mod tests_scoring;

// Re-exports for ergonomics
pub use bounded::{best_of, Bounded};
pub use dice::{Dice, DiceSource, RandomDice, ScriptedDice, RESTING_DICE};
pub use lineup::Entrant;
pub use rules::{next_round, round_target, WIN_THRESHOLD};
pub use scoring::{score, RollScore};
pub use seating::{plan_next_seating, SeatingPlan, SeatingViolation, TableOutcome};
pub use standings::{awards, select_winner, standings, Awards, Standing};
pub use teams::{Team, TeamResult};
