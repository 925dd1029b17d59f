//! Computer policies - order decisions for roles without a player.
//!
//! This module provides:
//! - `ComputerPolicy` trait for order strategies
//! - fixed, mirror-demand, base-stock and seeded random policies
//! - `choose_or_mirror`, which falls back to mirroring demand on policy errors

mod config;
mod heuristic;
mod random;
mod trait_def;

use std::sync::Arc;

pub use config::PolicyKind;
pub use heuristic::{BaseStock, FixedOrder, MirrorDemand};
pub use random::RandomOrder;
use tracing::warn;
pub use trait_def::{ComputerPolicy, PolicyContext, PolicyError};

/// Build the policy described by `kind`.
pub fn create_policy(kind: &PolicyKind) -> Arc<dyn ComputerPolicy> {
    match kind {
        PolicyKind::Fixed { quantity } => Arc::new(FixedOrder::new(*quantity)),
        PolicyKind::MirrorDemand => Arc::new(MirrorDemand),
        PolicyKind::BaseStock { target } => Arc::new(BaseStock::new(*target)),
        PolicyKind::Random { min, max } => Arc::new(RandomOrder::new(*min, *max)),
    }
}

/// Ask `policy` for an order; a failing policy mirrors the incoming demand.
pub fn choose_or_mirror(policy: &dyn ComputerPolicy, ctx: &PolicyContext<'_>) -> u64 {
    match policy.choose_order(ctx) {
        Ok(quantity) => quantity,
        Err(e) => {
            warn!(
                policy = policy.name(),
                round = ctx.round,
                position = ctx.position,
                error = %e,
                "Computer policy failed; mirroring demand"
            );
            ctx.incoming_demand
        }
    }
}
