//! Infrastructure layer - assembling shared state.

pub mod state;

pub use state::{build_state, StateBuilder};
