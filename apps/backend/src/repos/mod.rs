//! Typed access to match documents through the shared-state contract.

pub mod games;
pub mod players;
pub mod tables;
