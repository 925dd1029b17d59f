//! Random order policy.
//!
//! Draws uniformly from `min..=max`. The generator is re-seeded from
//! (game seed, round, position) on every call, so a replayed game orders the
//! same quantities and no state is shared between sessions.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::trait_def::{ComputerPolicy, PolicyContext, PolicyError};
use crate::domain::seed_derivation::derive_policy_seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomOrder {
    min: u64,
    max: u64,
}

impl RandomOrder {
    pub const NAME: &'static str = "random";

    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

impl ComputerPolicy for RandomOrder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_order(&self, ctx: &PolicyContext<'_>) -> Result<u64, PolicyError> {
        if self.min > self.max {
            return Err(PolicyError::InvalidConfig(format!(
                "empty range {}..={}",
                self.min, self.max
            )));
        }
        let seed = derive_policy_seed(ctx.game_seed, ctx.round, ctx.position);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(rng.random_range(self.min..=self.max))
    }
}
