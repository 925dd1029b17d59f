// Unit tests for error mapping - pure domain logic without sessions or storage
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, InvariantKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_rejection() {
    let de = DomainError::validation(ValidationKind::InvalidQuantity, "quantity -3");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidQuantity);
    assert!(app.is_recoverable());

    let de = DomainError::validation(ValidationKind::NotAPlayer, "stranger");
    let app: AppError = de.into();
    assert_eq!(app.code().as_str(), "NOT_A_PLAYER");

    let de = DomainError::validation(ValidationKind::InsufficientFunds, "costs 12, has 5");
    let app: AppError = de.into();
    assert_eq!(app.code().as_str(), "INSUFFICIENT_FUNDS");
    assert!(app.is_recoverable());
}

#[test]
fn maps_conflicts() {
    let dup = DomainError::conflict(ConflictKind::DuplicateOrder, "again");
    let app: AppError = dup.into();
    assert_eq!(app.code().as_str(), "DUPLICATE_ORDER");
    assert!(app.is_recoverable());

    let closed = DomainError::conflict(ConflictKind::RoundClosed, "late");
    let app: AppError = closed.into();
    assert_eq!(app.code().as_str(), "ROUND_CLOSED");

    let ended = DomainError::conflict(ConflictKind::GameEnded, "over");
    let app: AppError = ended.into();
    assert_eq!(app.code().as_str(), "GAME_ENDED");

    // Test generic conflict fallback
    let other = DomainError::conflict(ConflictKind::Other("x".to_string()), "generic");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "CONFLICT");
}

#[test]
fn maps_not_found() {
    let nf = DomainError::not_found(NotFoundKind::Game, "no game");
    let app: AppError = nf.into();
    assert_eq!(app.code(), ErrorCode::UnknownGame);
    assert!(app.is_recoverable());

    let nf = DomainError::not_found(NotFoundKind::Snapshot, "round 9");
    let app: AppError = nf.into();
    assert_eq!(app.code(), ErrorCode::SnapshotNotFound);
}

#[test]
fn fatal_errors_are_not_recoverable() {
    let inv = DomainError::invariant(InvariantKind::InsufficientTopology, "role 7");
    let app: AppError = inv.into();
    assert_eq!(app.code(), ErrorCode::InsufficientTopology);
    assert!(!app.is_recoverable());

    let cfg = DomainError::configuration("chain length 1");
    let app: AppError = cfg.into();
    assert_eq!(app.code(), ErrorCode::ConfigError);
    assert!(matches!(app, AppError::Config { .. }));
    assert!(!app.is_recoverable());
}

#[test]
fn maps_infra() {
    let down = DomainError::infra(InfraErrorKind::StoreUnavailable, "down");
    let app: AppError = down.into();
    assert_eq!(app.code().as_str(), "STORE_UNAVAILABLE");
    assert!(!app.is_recoverable());

    let corrupt = DomainError::infra(InfraErrorKind::DataCorruption, "bad json");
    let app: AppError = corrupt.into();
    assert_eq!(app.detail(), "bad json");
}
