//! Error codes for the Bunco engine.
//!
//! This module defines all error codes used throughout the engine.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in logs and simulator output.

use core::fmt;

/// Centralized error codes for the Bunco engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Document Validation
    /// A stored document does not match its schema
    MalformedDocument,
    /// A seat index outside 0..=3
    InvalidSeat,
    /// The match has already been started
    AlreadyStarted,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Game document not found
    GameNotFound,
    /// Table document not found
    TableNotFound,
    /// Player document not found
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Shared-State Store
    /// Store could not be reached
    StoreUnavailable,
    /// Store refused a write
    StoreRejected,
    /// Document could not be encoded or decoded
    StoreCodec,

    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Document Validation
            Self::MalformedDocument => "MALFORMED_DOCUMENT",
            Self::InvalidSeat => "INVALID_SEAT",
            Self::AlreadyStarted => "ALREADY_STARTED",
            Self::ValidationError => "VALIDATION_ERROR",

            // Resource Not Found
            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::TableNotFound => "TABLE_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            // Shared-State Store
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreRejected => "STORE_REJECTED",
            Self::StoreCodec => "STORE_CODEC",

            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
