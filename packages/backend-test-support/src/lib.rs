//! Backend test support utilities
//!
//! Shared by the integration test binaries: idempotent logging setup and
//! helpers for unique game codes and player ids.

pub mod logging;
pub mod unique_helpers;
