//! Static description of the supply chain: ordered roles, their neighbours,
//! initial stock and the shipment transit delay.

use serde::{Deserialize, Serialize};

use crate::domain::roles::{GameId, Position, Role, RoleTemplate};
use crate::domain::snapshot::{RoleState, RoundSnapshot, SNAPSHOT_SCHEMA_VERSION};
use crate::errors::domain::DomainError;

pub const MIN_CHAIN_LENGTH: usize = 2;
pub const MAX_CHAIN_LENGTH: usize = Position::MAX as usize;
pub const DEFAULT_TRANSIT_DELAY: u32 = 1;
pub const TOPOLOGY_SCHEMA_VERSION: u16 = 1;

/// Role names of the classic four-stage chain, customer side first.
pub const CLASSIC_ROLES: [&str; 4] = ["Retailer", "Wholesaler", "Distributor", "Manufacturer"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TopologyRecord", into = "TopologyRecord")]
pub struct RoleTopology {
    roles: Vec<Role>,
    transit_delay: u32,
    production_capacity: Option<u64>,
}

/// Persisted shape of a topology. Deserialization re-runs validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TopologyRecord {
    version: u16,
    roles: Vec<RoleTemplate>,
    transit_delay: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    production_capacity: Option<u64>,
}

impl RoleTopology {
    /// Build a chain from templates ordered from the customer side to the producer.
    pub fn new(templates: Vec<RoleTemplate>, transit_delay: u32) -> Result<Self, DomainError> {
        if templates.len() < MIN_CHAIN_LENGTH {
            return Err(DomainError::configuration(format!(
                "chain needs at least {MIN_CHAIN_LENGTH} roles, got {}",
                templates.len()
            )));
        }
        if templates.len() > MAX_CHAIN_LENGTH {
            return Err(DomainError::configuration(format!(
                "chain supports at most {MAX_CHAIN_LENGTH} roles, got {}",
                templates.len()
            )));
        }
        if transit_delay == 0 {
            return Err(DomainError::configuration(
                "transit delay must be at least one round",
            ));
        }

        let last = templates.len() - 1;
        let mut roles = Vec::with_capacity(templates.len());
        for (idx, template) in templates.into_iter().enumerate() {
            let position = idx as Position;
            let initial_inventory = non_negative(&template.name, "inventory", template.initial_inventory)?;
            let initial_backlog = non_negative(&template.name, "backlog", template.initial_backlog)?;

            if template.initial_in_transit.len() > transit_delay as usize {
                return Err(DomainError::configuration(format!(
                    "role {} has {} in-transit shipments but the transit delay is {transit_delay}",
                    template.name,
                    template.initial_in_transit.len()
                )));
            }
            let mut initial_in_transit = template
                .initial_in_transit
                .iter()
                .map(|v| non_negative(&template.name, "in-transit shipment", *v))
                .collect::<Result<Vec<_>, _>>()?;
            initial_in_transit.resize(transit_delay as usize, 0);
            let initial_requested = template
                .initial_requested
                .iter()
                .map(|v| non_negative(&template.name, "requested order", *v))
                .collect::<Result<Vec<_>, _>>()?;

            roles.push(Role {
                position,
                name: template.name,
                upstream: (idx < last).then(|| position + 1),
                downstream: (idx > 0).then(|| position - 1),
                initial_inventory,
                initial_backlog,
                initial_in_transit,
                initial_requested,
            });
        }

        Ok(Self {
            roles,
            transit_delay,
            production_capacity: None,
        })
    }

    /// The four-stage chain with identical starting inventory and a one-round delay.
    pub fn classic(initial_inventory: i64) -> Result<Self, DomainError> {
        Self::chain(&CLASSIC_ROLES, initial_inventory, DEFAULT_TRANSIT_DELAY)
    }

    pub fn chain(
        names: &[&str],
        initial_inventory: i64,
        transit_delay: u32,
    ) -> Result<Self, DomainError> {
        let templates = names
            .iter()
            .map(|name| RoleTemplate::new(*name, initial_inventory))
            .collect();
        Self::new(templates, transit_delay)
    }

    /// Cap the producing role's output per round.
    pub fn with_production_capacity(mut self, capacity: u64) -> Self {
        self.production_capacity = Some(capacity);
        self
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn role(&self, position: Position) -> Option<&Role> {
        self.roles.get(position as usize)
    }

    pub fn transit_delay(&self) -> u32 {
        self.transit_delay
    }

    pub fn production_capacity(&self) -> Option<u64> {
        self.production_capacity
    }

    pub fn customer_facing(&self) -> Position {
        0
    }

    pub fn producer(&self) -> Position {
        (self.roles.len() - 1) as Position
    }

    /// Round-0 snapshot built from the templates' initial values.
    pub fn initial_snapshot(&self, game_id: GameId) -> RoundSnapshot {
        let roles = self
            .roles
            .iter()
            .map(|role| RoleState {
                position: role.position,
                name: role.name.clone(),
                inventory: role.initial_inventory,
                backlog: role.initial_backlog,
                in_transit: role.initial_in_transit.clone(),
                incoming_demand: 0,
                order_placed: 0,
                shipment_received: 0,
                shipment_sent: 0,
                round_cost: 0,
                cumulative_cost: 0,
                money: 0,
                spent_money: 0,
                pending_orders: role.initial_requested.clone(),
            })
            .collect();

        RoundSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            game_id,
            round: 0,
            roles,
            aggregate_demand: 0,
            aggregate_supply: 0,
            cumulative_demand: 0,
            cumulative_supply: 0,
        }
    }

    /// Verify that a snapshot describes exactly this chain.
    pub fn check_snapshot(&self, snapshot: &RoundSnapshot) -> Result<(), DomainError> {
        if snapshot.roles.len() != self.roles.len() {
            return Err(DomainError::insufficient_topology(format!(
                "snapshot for round {} has {} roles, topology has {}",
                snapshot.round,
                snapshot.roles.len(),
                self.roles.len()
            )));
        }
        for (role, state) in self.roles.iter().zip(&snapshot.roles) {
            if role.position != state.position {
                return Err(DomainError::insufficient_topology(format!(
                    "snapshot role at index {} claims position {}",
                    role.position, state.position
                )));
            }
            if state.in_transit.len() != self.transit_delay as usize {
                return Err(DomainError::insufficient_topology(format!(
                    "role {} carries {} in-transit slots, transit delay is {}",
                    role.position,
                    state.in_transit.len(),
                    self.transit_delay
                )));
            }
            if state.pending_orders.len() != role.initial_requested.len() {
                return Err(DomainError::insufficient_topology(format!(
                    "role {} carries {} pending orders, expected {}",
                    role.position,
                    state.pending_orders.len(),
                    role.initial_requested.len()
                )));
            }
            for neighbor in [role.upstream, role.downstream].into_iter().flatten() {
                if self.role(neighbor).is_none() {
                    return Err(DomainError::insufficient_topology(format!(
                        "role {} references missing neighbor {neighbor}",
                        role.position
                    )));
                }
            }
        }
        Ok(())
    }
}

fn non_negative(role: &str, what: &str, value: i64) -> Result<u64, DomainError> {
    u64::try_from(value).map_err(|_| {
        DomainError::configuration(format!("role {role}: initial {what} must not be negative, got {value}"))
    })
}

impl TryFrom<TopologyRecord> for RoleTopology {
    type Error = DomainError;

    fn try_from(record: TopologyRecord) -> Result<Self, Self::Error> {
        if record.version != TOPOLOGY_SCHEMA_VERSION {
            return Err(DomainError::configuration(format!(
                "unsupported topology version {}",
                record.version
            )));
        }
        let topology = RoleTopology::new(record.roles, record.transit_delay)?;
        Ok(match record.production_capacity {
            Some(cap) => topology.with_production_capacity(cap),
            None => topology,
        })
    }
}

impl From<RoleTopology> for TopologyRecord {
    fn from(topology: RoleTopology) -> Self {
        let roles = topology
            .roles
            .into_iter()
            .map(|role| RoleTemplate {
                name: role.name,
                initial_inventory: role.initial_inventory as i64,
                initial_backlog: role.initial_backlog as i64,
                initial_in_transit: role
                    .initial_in_transit
                    .into_iter()
                    .map(|v| v as i64)
                    .collect(),
                initial_requested: role
                    .initial_requested
                    .into_iter()
                    .map(|v| v as i64)
                    .collect(),
            })
            .collect();
        TopologyRecord {
            version: TOPOLOGY_SCHEMA_VERSION,
            roles,
            transit_delay: topology.transit_delay,
            production_capacity: topology.production_capacity,
        }
    }
}
