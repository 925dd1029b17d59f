//! Error codes reported to players and operators.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! carried by `OrderRejected` events.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Centralized error codes for the round resolution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ErrorCode {
    // Order Validation
    /// Order quantity below zero
    InvalidQuantity,
    /// Submitting player holds no role in the game
    NotAPlayer,
    /// Order costs more than the role's remaining money
    InsufficientFunds,
    /// General validation error
    ValidationError,

    // Session Conflicts
    /// An order already exists for this player and round
    DuplicateOrder,
    /// Round is not accepting orders
    RoundClosed,
    /// Game has ended
    GameEnded,
    /// A live session already exists for the game
    SessionExists,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // Resource Not Found
    /// No live session for the game id
    UnknownGame,
    /// Requested round has no snapshot
    SnapshotNotFound,
    /// No topology stored for the game
    TopologyNotFound,
    /// General not found error
    NotFound,

    // Engine Invariants
    /// Roles or orders reference a role absent from the topology
    InsufficientTopology,
    /// Arithmetic overflow while resolving a round
    Overflow,
    /// Other invariant violation
    InvariantViolation,

    // System Errors
    /// Snapshot store unavailable
    StoreUnavailable,
    /// Stored data failed to decode
    DataCorruption,
    /// Configuration error
    ConfigError,
    /// Internal error
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::NotAPlayer => "NOT_A_PLAYER",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::DuplicateOrder => "DUPLICATE_ORDER",
            Self::RoundClosed => "ROUND_CLOSED",
            Self::GameEnded => "GAME_ENDED",
            Self::SessionExists => "SESSION_EXISTS",
            Self::Conflict => "CONFLICT",

            Self::UnknownGame => "UNKNOWN_GAME",
            Self::SnapshotNotFound => "SNAPSHOT_NOT_FOUND",
            Self::TopologyNotFound => "TOPOLOGY_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::InsufficientTopology => "INSUFFICIENT_TOPOLOGY",
            Self::Overflow => "OVERFLOW",
            Self::InvariantViolation => "INVARIANT_VIOLATION",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }

    const ALL: [ErrorCode; 20] = [
        Self::InvalidQuantity,
        Self::NotAPlayer,
        Self::InsufficientFunds,
        Self::ValidationError,
        Self::DuplicateOrder,
        Self::RoundClosed,
        Self::GameEnded,
        Self::SessionExists,
        Self::Conflict,
        Self::UnknownGame,
        Self::SnapshotNotFound,
        Self::TopologyNotFound,
        Self::NotFound,
        Self::InsufficientTopology,
        Self::Overflow,
        Self::InvariantViolation,
        Self::StoreUnavailable,
        Self::DataCorruption,
        Self::ConfigError,
        Self::Internal,
    ];

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for &'static str {
    fn from(code: ErrorCode) -> Self {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown error code: {value}"))
    }
}
