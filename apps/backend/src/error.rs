use thiserror::Error;

use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::errors::ErrorCode;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Store error: {source}")]
    Store { code: ErrorCode, source: StoreError },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// Extract the error code from any variant
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Store { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Extract the human-readable detail from any variant
    pub fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. } => detail.clone(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Store { source, .. } => source.to_string(),
            AppError::Config { detail } => detail.clone(),
        }
    }

    /// Whether retrying on the next trigger may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Store {
                source: StoreError::Unavailable(_),
                ..
            }
        )
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let code = match &e {
            StoreError::Unavailable(_) => ErrorCode::StoreUnavailable,
            StoreError::Rejected { .. } => ErrorCode::StoreRejected,
            StoreError::Codec { .. } => ErrorCode::StoreCodec,
        };
        AppError::Store { code, source: e }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::MalformedDocument => ErrorCode::MalformedDocument,
                    ValidationKind::InvalidSeat => ErrorCode::InvalidSeat,
                    ValidationKind::AlreadyStarted => ErrorCode::AlreadyStarted,
                    _ => ErrorCode::ValidationError,
                };
                AppError::Validation { code, detail }
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Game => ErrorCode::GameNotFound,
                    NotFoundKind::Table => ErrorCode::TableNotFound,
                    NotFoundKind::Player => ErrorCode::PlayerNotFound,
                    _ => ErrorCode::NotFound,
                };
                AppError::NotFound { code, detail }
            }
        }
    }
}

