//! Goods flow for one round.
//!
//! Pure and deterministic: the same prior snapshot, orders and customer demand
//! always produce the same next snapshot.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::budget::Budget;
use crate::domain::order_book::RoleOrders;
use crate::domain::snapshot::{RoleState, RoundSnapshot};
use crate::domain::topology::RoleTopology;
use crate::errors::domain::{DomainError, InvariantKind};

/// Per-unit, per-round cost of stock on hand and of unmet demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRates {
    pub holding: u64,
    pub backlog: u64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            holding: 1,
            backlog: 2,
        }
    }
}

/// Exogenous inputs of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundInputs {
    pub customer_demand: u64,
    /// Cap on what the producing role can start this round.
    pub supply_limit: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct FlowResolver<'a> {
    topology: &'a RoleTopology,
    costs: CostRates,
    budget: Option<&'a Budget>,
}

impl<'a> FlowResolver<'a> {
    pub fn new(topology: &'a RoleTopology, costs: CostRates) -> Self {
        Self {
            topology,
            costs,
            budget: None,
        }
    }

    /// Charge every order against the role's money.
    pub fn with_budget(mut self, budget: Option<&'a Budget>) -> Self {
        self.budget = budget;
        self
    }

    /// Derive the snapshot of `orders.round` from the previous round's snapshot.
    pub fn resolve(
        &self,
        prior: &RoundSnapshot,
        orders: &RoleOrders,
        customer_demand: u64,
    ) -> Result<RoundSnapshot, DomainError> {
        self.resolve_with(
            prior,
            orders,
            RoundInputs {
                customer_demand,
                supply_limit: None,
            },
        )
    }

    pub fn resolve_with(
        &self,
        prior: &RoundSnapshot,
        orders: &RoleOrders,
        inputs: RoundInputs,
    ) -> Result<RoundSnapshot, DomainError> {
        let customer_demand = inputs.customer_demand;
        self.topology.check_snapshot(prior)?;
        if orders.entries.len() != self.topology.len() {
            return Err(DomainError::insufficient_topology(format!(
                "{} orders for a chain of {} roles",
                orders.entries.len(),
                self.topology.len()
            )));
        }
        let expected_round = prior.round.checked_add(1).ok_or_else(|| overflow("round"))?;
        if orders.round != expected_round {
            return Err(DomainError::invariant(
                InvariantKind::Other("round mismatch".into()),
                format!(
                    "orders for round {} cannot follow snapshot {}",
                    orders.round, prior.round
                ),
            ));
        }

        let mut queues: Vec<VecDeque<u64>> = prior
            .roles
            .iter()
            .map(|r| r.in_transit.iter().copied().collect())
            .collect();
        let arrivals: Vec<u64> = queues
            .iter_mut()
            .map(|q| q.pop_front().unwrap_or(0))
            .collect();

        let producer = self.topology.producer() as usize;
        let mut roles = Vec::with_capacity(prior.roles.len());
        let mut incoming_demand = customer_demand;
        let mut aggregate_supply = 0;

        for (idx, (state, order)) in prior.roles.iter().zip(&orders.entries).enumerate() {
            if order.position != state.position {
                return Err(DomainError::insufficient_topology(format!(
                    "order at index {idx} is for position {}",
                    order.position
                )));
            }
            let role = self.topology.role(state.position).ok_or_else(|| {
                DomainError::insufficient_topology(format!("no role at position {}", state.position))
            })?;

            let mut pending_orders = state.pending_orders.clone();
            let demand_seen = if pending_orders.is_empty() {
                incoming_demand
            } else {
                pending_orders.push(incoming_demand);
                pending_orders.remove(0)
            };

            let arrival = arrivals[idx];
            let available = state
                .inventory
                .checked_add(arrival)
                .ok_or_else(|| overflow("inventory"))?;
            let owed = state
                .backlog
                .checked_add(demand_seen)
                .ok_or_else(|| overflow("backlog"))?;
            let shipped = available.min(owed);
            let inventory = available - shipped;
            let backlog = owed - shipped;

            if let Some(downstream) = role.downstream {
                queues
                    .get_mut(downstream as usize)
                    .ok_or_else(|| {
                        DomainError::insufficient_topology(format!(
                            "role {} ships to missing role {downstream}",
                            role.position
                        ))
                    })?
                    .push_back(shipped);
            }
            if idx == producer {
                let produced = [self.topology.production_capacity(), inputs.supply_limit]
                    .into_iter()
                    .flatten()
                    .fold(order.quantity, u64::min);
                queues[idx].push_back(produced);
                aggregate_supply = shipped;
            }

            let round_cost = inventory
                .checked_mul(self.costs.holding)
                .and_then(|h| backlog.checked_mul(self.costs.backlog).and_then(|b| h.checked_add(b)))
                .ok_or_else(|| overflow("cost"))?;
            let cumulative_cost = state
                .cumulative_cost
                .checked_add(round_cost)
                .ok_or_else(|| overflow("cumulative cost"))?;
            let (money, spent_money) = self.charge(state, order.quantity)?;

            roles.push(RoleState {
                position: state.position,
                name: state.name.clone(),
                inventory,
                backlog,
                in_transit: Vec::new(),
                incoming_demand: demand_seen,
                order_placed: order.quantity,
                shipment_received: arrival,
                shipment_sent: shipped,
                round_cost,
                cumulative_cost,
                money,
                spent_money,
                pending_orders,
            });
            incoming_demand = order.quantity;
        }

        for (role, queue) in roles.iter_mut().zip(queues) {
            role.in_transit = queue.into();
        }

        Ok(RoundSnapshot {
            schema_version: prior.schema_version,
            game_id: prior.game_id,
            round: expected_round,
            roles,
            aggregate_demand: customer_demand,
            aggregate_supply,
            cumulative_demand: prior
                .cumulative_demand
                .checked_add(customer_demand)
                .ok_or_else(|| overflow("cumulative demand"))?,
            cumulative_supply: prior
                .cumulative_supply
                .checked_add(aggregate_supply)
                .ok_or_else(|| overflow("cumulative supply"))?,
        })
    }
}

impl FlowResolver<'_> {
    /// Money left and total spent after paying for `quantity`.
    fn charge(&self, state: &RoleState, quantity: u64) -> Result<(u64, u64), DomainError> {
        let Some(budget) = self.budget else {
            return Ok((state.money, state.spent_money));
        };
        let cost = budget
            .order_cost(state.position, quantity)
            .ok_or_else(|| overflow("order cost"))?;
        let money = state.money.checked_sub(cost).ok_or_else(|| {
            DomainError::invariant(
                InvariantKind::Other("OVERSPENT".into()),
                format!(
                    "role {} ordered {quantity} for {cost} with {} left",
                    state.position, state.money
                ),
            )
        })?;
        let spent = state
            .spent_money
            .checked_add(cost)
            .ok_or_else(|| overflow("spent money"))?;
        Ok((money, spent))
    }
}

fn overflow(what: &str) -> DomainError {
    DomainError::invariant(InvariantKind::Overflow, format!("{what} overflowed"))
}
