//! Domain-level error type used across the engine, services and adapters.
//!
//! This error type is transport- and storage-agnostic. Services return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Validation failures caused by caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    /// Order quantity below zero.
    InvalidQuantity,
    /// Caller is not assigned to any role in the game.
    NotAPlayer,
    /// The order costs more than the role can pay.
    InsufficientFunds,
    Other(String),
}

/// Semantic conflicts with the current state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// An order already exists for (player, round).
    DuplicateOrder,
    /// The round is closing, resolved, or not the open round.
    RoundClosed,
    /// The game has ended; no more orders are accepted.
    GameEnded,
    /// A live session already exists for the game id.
    SessionExists,
    Other(String),
}

/// Domain-level not found entities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Snapshot,
    Topology,
    Other(String),
}

/// Broken invariants. These are programming errors, never user-recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantKind {
    /// State or orders reference a role/neighbor absent from the topology.
    InsufficientTopology,
    /// Arithmetic left the representable range.
    Overflow,
    Other(String),
}

/// Infra error kinds to distinguish operational failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    StoreUnavailable,
    DataCorruption,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid session configuration; only raised while creating a session
    Configuration(String),
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Engine invariant violated
    Invariant(InvariantKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Configuration(d) => write!(f, "configuration error: {d}"),
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Invariant(kind, d) => write!(f, "invariant violated {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn configuration(detail: impl Into<String>) -> Self {
        Self::Configuration(detail.into())
    }
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn invariant(kind: InvariantKind, detail: impl Into<String>) -> Self {
        Self::Invariant(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    pub fn insufficient_topology(detail: impl Into<String>) -> Self {
        Self::invariant(InvariantKind::InsufficientTopology, detail)
    }

    /// Fatal errors must abort the current resolution and never be retried blindly.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::Configuration(_) | DomainError::Invariant(..)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_detail() {
        let err = DomainError::conflict(ConflictKind::DuplicateOrder, "player already ordered");
        assert_eq!(
            err.to_string(),
            "conflict DuplicateOrder: player already ordered"
        );
    }

    #[test]
    fn only_configuration_and_invariants_are_fatal() {
        assert!(DomainError::configuration("chain too short").is_fatal());
        assert!(DomainError::insufficient_topology("missing role 3").is_fatal());
        assert!(!DomainError::conflict(ConflictKind::RoundClosed, "late").is_fatal());
        assert!(!DomainError::not_found(NotFoundKind::Game, "gone").is_fatal());
        assert!(!DomainError::infra(InfraErrorKind::StoreUnavailable, "down").is_fatal());
    }
}
