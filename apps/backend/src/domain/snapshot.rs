//! Immutable per-round record of the chain state.
//!
//! Snapshots are persisted and broadcast. Serialization is versioned; the
//! canonical encoding (compact JSON, field order fixed by the struct) also
//! feeds the BLAKE3 digest carried in `RoundResolved`.

use serde::{Deserialize, Serialize};

use crate::domain::roles::{GameId, Position, Round};
use crate::errors::domain::{DomainError, InfraErrorKind};

pub const SNAPSHOT_SCHEMA_VERSION: u16 = 1;

/// State of one role after a round has been resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleState {
    pub position: Position,
    pub name: String,
    pub inventory: u64,
    pub backlog: u64,
    /// Shipments on the way to this role; index 0 arrives next round.
    pub in_transit: Vec<u64>,
    /// Demand this role saw in the round (downstream order or customer demand).
    pub incoming_demand: u64,
    /// Order this role placed upstream in the round.
    pub order_placed: u64,
    pub shipment_received: u64,
    pub shipment_sent: u64,
    pub round_cost: u64,
    pub cumulative_cost: u64,
    /// Funds left after paying for this round's order.
    #[serde(default)]
    pub money: u64,
    #[serde(default)]
    pub spent_money: u64,
    /// Downstream orders not yet seen; the front is served next round.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_orders: Vec<u64>,
}

impl RoleState {
    /// Demand this role works from next round when `raw` is ordered from it.
    pub fn demand_seen(&self, raw: u64) -> u64 {
        self.pending_orders.first().copied().unwrap_or(raw)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub schema_version: u16,
    pub game_id: GameId,
    pub round: Round,
    /// Ordered by position, customer side first.
    pub roles: Vec<RoleState>,
    /// End-customer demand of the round.
    pub aggregate_demand: u64,
    /// Quantity shipped out of the producing role in the round.
    pub aggregate_supply: u64,
    pub cumulative_demand: u64,
    pub cumulative_supply: u64,
}

impl RoundSnapshot {
    pub fn role(&self, position: Position) -> Option<&RoleState> {
        self.roles.get(position as usize)
    }

    pub fn total_cost(&self) -> u64 {
        self.roles
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.cumulative_cost))
    }

    /// Canonical bytes used for persistence and digests.
    pub fn encode(&self) -> Result<Vec<u8>, DomainError> {
        serde_json::to_vec(self).map_err(|e| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("snapshot for round {} failed to encode: {e}", self.round),
            )
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DomainError> {
        let snapshot: RoundSnapshot = serde_json::from_slice(bytes).map_err(|e| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("snapshot failed to decode: {e}"),
            )
        })?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!(
                    "unsupported snapshot schema version {} (expected {SNAPSHOT_SCHEMA_VERSION})",
                    snapshot.schema_version
                ),
            ));
        }
        Ok(snapshot)
    }

    /// Hex BLAKE3 digest of the canonical encoding.
    pub fn digest(&self) -> Result<String, DomainError> {
        let bytes = self.encode()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}
