use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, InvariantKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;

/// Service-level error returned by the coordinator and session services.
///
/// Every variant carries a stable [`ErrorCode`]; `Rejected` errors are the
/// user-facing, recoverable ones that end up in `OrderRejected` events.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Order rejected: {detail}")]
    Rejected { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Invariant violated: {detail}")]
    Invariant { code: ErrorCode, detail: String },
    #[error("Store error: {detail}")]
    Store { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Rejected { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Invariant { code, .. } => *code,
            AppError::Store { code, .. } => *code,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AppError::Rejected { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Config { detail }
            | AppError::Invariant { detail, .. }
            | AppError::Store { detail, .. }
            | AppError::Internal { detail } => detail,
        }
    }

    /// Recoverable errors are reported to the caller and leave every session untouched.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Rejected { .. } | AppError::NotFound { .. })
    }

    pub fn rejected(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn unknown_game(game_id: impl std::fmt::Display) -> Self {
        Self::not_found(ErrorCode::UnknownGame, format!("No live session for game {game_id}"))
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Configuration(detail) => AppError::Config { detail },
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::InvalidQuantity => ErrorCode::InvalidQuantity,
                    ValidationKind::NotAPlayer => ErrorCode::NotAPlayer,
                    ValidationKind::InsufficientFunds => ErrorCode::InsufficientFunds,
                    ValidationKind::Other(_) => ErrorCode::ValidationError,
                };
                AppError::Rejected { code, detail }
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::DuplicateOrder => ErrorCode::DuplicateOrder,
                    ConflictKind::RoundClosed => ErrorCode::RoundClosed,
                    ConflictKind::GameEnded => ErrorCode::GameEnded,
                    ConflictKind::SessionExists => ErrorCode::SessionExists,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::Rejected { code, detail }
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Game => ErrorCode::UnknownGame,
                    NotFoundKind::Snapshot => ErrorCode::SnapshotNotFound,
                    NotFoundKind::Topology => ErrorCode::TopologyNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::NotFound { code, detail }
            }
            DomainError::Invariant(kind, detail) => {
                let code = match kind {
                    InvariantKind::InsufficientTopology => ErrorCode::InsufficientTopology,
                    InvariantKind::Overflow => ErrorCode::Overflow,
                    InvariantKind::Other(_) => ErrorCode::InvariantViolation,
                };
                AppError::Invariant { code, detail }
            }
            DomainError::Infra(kind, detail) => {
                let code = match kind {
                    InfraErrorKind::StoreUnavailable => ErrorCode::StoreUnavailable,
                    InfraErrorKind::DataCorruption => ErrorCode::DataCorruption,
                    InfraErrorKind::Other(_) => ErrorCode::Internal,
                };
                AppError::Store { code, detail }
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::internal(format!("serialization error: {e}"))
    }
}
