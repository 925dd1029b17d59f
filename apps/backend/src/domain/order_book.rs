//! Per-round collection of player orders.
//!
//! The book accepts at most one order per player for its round. Once marked
//! closing it is read-only and produces the finalized role → quantity mapping,
//! filling computer roles and missing players at that point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::assignment::Assignments;
use crate::domain::roles::{PlayerId, Position, Round};
use crate::domain::topology::RoleTopology;
use crate::errors::domain::{ConflictKind, DomainError, InvariantKind, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub player: PlayerId,
    pub round: Round,
    pub quantity: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    Open,
    Closing,
}

/// Where a finalized quantity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    Player,
    /// Role has no assigned player.
    Computer,
    /// Assigned player did not order in time.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOrder {
    pub position: Position,
    pub quantity: u64,
    pub source: OrderSource,
}

/// Finalized orders of one round, indexed by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOrders {
    pub round: Round,
    pub entries: Vec<RoleOrder>,
}

/// Request handed to the fill callback of [`OrderBook::orders_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRequest {
    pub round: Round,
    pub position: Position,
    /// Order of the downstream role, or customer demand for position 0.
    pub incoming_demand: u64,
    pub source: OrderSource,
}

#[derive(Debug, Clone)]
pub struct OrderBook {
    round: Round,
    status: BookStatus,
    orders: BTreeMap<PlayerId, Order>,
}

impl OrderBook {
    pub fn open(round: Round) -> Self {
        Self {
            round,
            status: BookStatus::Open,
            orders: BTreeMap::new(),
        }
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn status(&self) -> BookStatus {
        self.status
    }

    pub fn order_of(&self, player: PlayerId) -> Option<&Order> {
        self.orders.get(&player)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Record an order for `player`.
    ///
    /// Caller membership is checked by the session; the book only knows rounds
    /// and quantities.
    pub fn submit(
        &mut self,
        player: PlayerId,
        round: Round,
        quantity: i64,
    ) -> Result<Order, DomainError> {
        if self.status == BookStatus::Closing {
            return Err(DomainError::conflict(
                ConflictKind::RoundClosed,
                format!("round {} is closing", self.round),
            ));
        }
        if round != self.round {
            return Err(DomainError::conflict(
                ConflictKind::RoundClosed,
                format!("round {round} is not open; open round is {}", self.round),
            ));
        }
        let quantity = u64::try_from(quantity).map_err(|_| {
            DomainError::validation(
                ValidationKind::InvalidQuantity,
                format!("order quantity must not be negative, got {quantity}"),
            )
        })?;
        if self.orders.contains_key(&player) {
            return Err(DomainError::conflict(
                ConflictKind::DuplicateOrder,
                format!("player {player} already ordered in round {round}"),
            ));
        }

        let order = Order {
            player,
            round,
            quantity,
        };
        self.orders.insert(player, order);
        Ok(order)
    }

    /// Every expected player has an order for this round.
    ///
    /// Computer roles have no player and are never expected.
    pub fn is_complete<I>(&self, expected: I) -> bool
    where
        I: IntoIterator<Item = PlayerId>,
    {
        expected
            .into_iter()
            .all(|player| self.orders.contains_key(&player))
    }

    pub fn missing<I>(&self, expected: I) -> Vec<PlayerId>
    where
        I: IntoIterator<Item = PlayerId>,
    {
        expected
            .into_iter()
            .filter(|player| !self.orders.contains_key(player))
            .collect()
    }

    /// Stop accepting orders. Idempotent.
    pub fn close(&mut self) {
        self.status = BookStatus::Closing;
    }

    /// Finalize the round's orders from the customer side upstream.
    ///
    /// `fill` is called for every role without a player order, in position
    /// order, after the downstream role's quantity is known.
    pub fn orders_for<F>(
        &self,
        round: Round,
        topology: &RoleTopology,
        assignments: &Assignments,
        customer_demand: u64,
        mut fill: F,
    ) -> Result<RoleOrders, DomainError>
    where
        F: FnMut(FillRequest) -> u64,
    {
        if round != self.round {
            return Err(DomainError::conflict(
                ConflictKind::RoundClosed,
                format!("book holds round {}, asked for {round}", self.round),
            ));
        }
        if self.status != BookStatus::Closing {
            return Err(DomainError::invariant(
                InvariantKind::Other("book open".into()),
                format!("round {round} must be closing before orders are finalized"),
            ));
        }
        for order in self.orders.values() {
            if assignments.position_of(order.player).is_none() {
                return Err(DomainError::insufficient_topology(format!(
                    "order from player {} has no role in the chain",
                    order.player
                )));
            }
        }

        let mut entries = Vec::with_capacity(topology.len());
        let mut incoming_demand = customer_demand;
        for role in topology.roles() {
            let position = role.position;
            let (quantity, source) = match assignments.player_at(position) {
                Some(player) => match self.orders.get(&player) {
                    Some(order) => (order.quantity, OrderSource::Player),
                    None => (
                        fill(FillRequest {
                            round,
                            position,
                            incoming_demand,
                            source: OrderSource::Fallback,
                        }),
                        OrderSource::Fallback,
                    ),
                },
                None => (
                    fill(FillRequest {
                        round,
                        position,
                        incoming_demand,
                        source: OrderSource::Computer,
                    }),
                    OrderSource::Computer,
                ),
            };
            entries.push(RoleOrder {
                position,
                quantity,
                source,
            });
            incoming_demand = quantity;
        }

        Ok(RoleOrders { round, entries })
    }
}
