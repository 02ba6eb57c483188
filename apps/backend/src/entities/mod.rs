//! Typed documents stored under `games/{code}`.

pub mod games;
pub mod players;
pub mod tables;

pub use games::{GameDoc, WinnerRecord};
pub use players::PlayerDoc;
pub use tables::{RollResult, TableDoc};
