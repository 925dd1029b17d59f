//! Money accounting: starting funds and the price of an order.
//!
//! Orders are paid when the round resolves. A role can never place an order
//! it cannot pay for; player orders are refused and computer orders are cut
//! down to what the role can afford.

use serde::{Deserialize, Serialize};

use crate::domain::roles::Position;
use crate::domain::snapshot::RoundSnapshot;
use crate::domain::topology::RoleTopology;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub start_money: u64,
    /// Price of one ordered unit.
    pub unit_price: u64,
    /// Flat fee per non-empty order.
    #[serde(default)]
    pub order_fee: u64,
    /// Per-role exceptions to the values above.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<RoleBudget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBudget {
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_money: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_fee: Option<u64>,
}

/// Effective prices of one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prices {
    pub start_money: u64,
    pub unit_price: u64,
    pub order_fee: u64,
}

impl Budget {
    pub fn new(start_money: u64, unit_price: u64) -> Self {
        Self {
            start_money,
            unit_price,
            order_fee: 0,
            overrides: Vec::new(),
        }
    }

    pub fn with_order_fee(mut self, fee: u64) -> Self {
        self.order_fee = fee;
        self
    }

    pub fn with_override(mut self, role: RoleBudget) -> Self {
        self.overrides.push(role);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (idx, role) in self.overrides.iter().enumerate() {
            if self.overrides[..idx].iter().any(|o| o.position == role.position) {
                return Err(DomainError::configuration(format!(
                    "budget override for position {} is given twice",
                    role.position
                )));
            }
        }
        Ok(())
    }

    /// Every override must name a role of `topology`.
    pub fn check_positions(&self, topology: &RoleTopology) -> Result<(), DomainError> {
        match self.overrides.iter().find(|o| topology.role(o.position).is_none()) {
            Some(o) => Err(DomainError::configuration(format!(
                "budget override for position {} but the chain has {} roles",
                o.position,
                topology.len()
            ))),
            None => Ok(()),
        }
    }

    pub fn prices_for(&self, position: Position) -> Prices {
        let role = self.overrides.iter().find(|o| o.position == position);
        Prices {
            start_money: role.and_then(|r| r.start_money).unwrap_or(self.start_money),
            unit_price: role.and_then(|r| r.unit_price).unwrap_or(self.unit_price),
            order_fee: role.and_then(|r| r.order_fee).unwrap_or(self.order_fee),
        }
    }

    /// Price of ordering `quantity` units; `None` on overflow.
    pub fn order_cost(&self, position: Position, quantity: u64) -> Option<u64> {
        if quantity == 0 {
            return Some(0);
        }
        let prices = self.prices_for(position);
        quantity
            .checked_mul(prices.unit_price)?
            .checked_add(prices.order_fee)
    }

    /// Largest quantity `position` can pay for with `money`.
    pub fn affordable(&self, position: Position, money: u64) -> u64 {
        let prices = self.prices_for(position);
        if money < prices.order_fee {
            return 0;
        }
        match prices.unit_price {
            0 => u64::MAX,
            price => (money - prices.order_fee) / price,
        }
    }

    /// Hand every role its starting money.
    pub fn fund(&self, snapshot: &mut RoundSnapshot) {
        for role in &mut snapshot.roles {
            role.money = self.prices_for(role.position).start_money;
        }
    }
}
