//! Deterministic order policies.

use super::trait_def::{ComputerPolicy, PolicyContext, PolicyError};

/// Always orders the same quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOrder {
    quantity: u64,
}

impl FixedOrder {
    pub const NAME: &'static str = "fixed";

    pub fn new(quantity: u64) -> Self {
        Self { quantity }
    }
}

impl ComputerPolicy for FixedOrder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_order(&self, _ctx: &PolicyContext<'_>) -> Result<u64, PolicyError> {
        Ok(self.quantity)
    }
}

/// Passes the incoming demand upstream unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorDemand;

impl MirrorDemand {
    pub const NAME: &'static str = "mirror_demand";
}

impl ComputerPolicy for MirrorDemand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_order(&self, ctx: &PolicyContext<'_>) -> Result<u64, PolicyError> {
        Ok(ctx.incoming_demand)
    }
}

/// Order-up-to policy on the inventory position.
///
/// Orders enough to bring on-hand plus pipeline stock back to `target` after
/// serving this round's demand and the existing backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseStock {
    target: u64,
}

impl BaseStock {
    pub const NAME: &'static str = "base_stock";

    pub fn new(target: u64) -> Self {
        Self { target }
    }
}

impl ComputerPolicy for BaseStock {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_order(&self, ctx: &PolicyContext<'_>) -> Result<u64, PolicyError> {
        let overflow = || PolicyError::Overflow(format!("base stock for position {}", ctx.position));
        let needed = self
            .target
            .checked_add(ctx.role.backlog)
            .and_then(|v| v.checked_add(ctx.incoming_demand))
            .ok_or_else(overflow)?;
        let pipeline = ctx
            .role
            .in_transit
            .iter()
            .try_fold(ctx.role.inventory, |acc, q| acc.checked_add(*q))
            .ok_or_else(overflow)?;
        Ok(needed.saturating_sub(pipeline))
    }
}
