use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GameId = Uuid;
pub type PlayerId = Uuid;
/// Position in the chain; 0 is the role closest to the end customer.
pub type Position = u8;
/// Round number; 0 is the initial state, playable rounds start at 1.
pub type Round = u32;

/// Configuration-side description of a role, before validation.
///
/// Values are signed so that negative configuration can be rejected
/// with a proper error instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTemplate {
    pub name: String,
    pub initial_inventory: i64,
    #[serde(default)]
    pub initial_backlog: i64,
    /// Shipments already on the way at round 0; index 0 arrives in round 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_in_transit: Vec<i64>,
    /// Downstream orders queued at round 0. Each round this role serves the
    /// front of the queue and the new order joins the back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_requested: Vec<i64>,
}

impl RoleTemplate {
    pub fn new(name: impl Into<String>, initial_inventory: i64) -> Self {
        Self {
            name: name.into(),
            initial_inventory,
            initial_backlog: 0,
            initial_in_transit: Vec::new(),
            initial_requested: Vec::new(),
        }
    }

    pub fn with_backlog(mut self, backlog: i64) -> Self {
        self.initial_backlog = backlog;
        self
    }

    pub fn with_in_transit(mut self, in_transit: Vec<i64>) -> Self {
        self.initial_in_transit = in_transit;
        self
    }

    pub fn with_requested(mut self, requested: Vec<i64>) -> Self {
        self.initial_requested = requested;
        self
    }
}

/// A validated node of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub position: Position,
    pub name: String,
    /// Supplier of this role; `None` for the producing role.
    pub upstream: Option<Position>,
    /// Customer of this role; `None` for the role facing end customers.
    pub downstream: Option<Position>,
    pub initial_inventory: u64,
    pub initial_backlog: u64,
    /// Padded to the topology's transit delay.
    pub initial_in_transit: Vec<u64>,
    pub initial_requested: Vec<u64>,
}

impl Role {
    pub fn is_producer(&self) -> bool {
        self.upstream.is_none()
    }

    pub fn faces_customer(&self) -> bool {
        self.downstream.is_none()
    }
}
