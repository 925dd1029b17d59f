//! Computer policy trait definition.

use std::fmt;

use crate::domain::roles::{Position, Round};
use crate::domain::snapshot::RoleState;

/// Errors that can occur while a policy decides an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Policy configuration cannot produce an order
    InvalidConfig(String),
    /// Arithmetic left the representable range
    Overflow(String),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::InvalidConfig(msg) => write!(f, "policy config invalid: {msg}"),
            PolicyError::Overflow(msg) => write!(f, "policy overflow: {msg}"),
        }
    }
}

impl std::error::Error for PolicyError {}

/// What a policy sees when filling an order for one role.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub game_seed: u64,
    pub round: Round,
    pub position: Position,
    /// Order of the downstream role this round, or customer demand.
    pub incoming_demand: u64,
    /// State of the role at the end of the previous round.
    pub role: &'a RoleState,
}

/// Order strategy for computer-controlled roles and missed deadlines.
///
/// Implementations must be pure: the same context gives the same order.
pub trait ComputerPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn choose_order(&self, ctx: &PolicyContext<'_>) -> Result<u64, PolicyError>;
}
