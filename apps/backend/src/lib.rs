#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod realtime;
pub mod repos;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod utils;


// Re-exports for public API
pub use config::{EngineConfig, StoreConfig, Timings, TotalPointsMode};
pub use error::AppError;
pub use errors::ErrorCode;
pub use infra::{build_state, StateBuilder};
pub use realtime::{ClientSession, HostAgent, SessionHandle, TableAgent};
pub use services::game_flow::{Disposition, GameFlowService, IgnoreReason};
pub use state::app_state::AppState;
pub use store::{DocumentStore, GameCode, MemoryStore};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
