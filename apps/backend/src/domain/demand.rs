//! Exogenous end-customer demand.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::roles::Round;
use crate::domain::seed_derivation::derive_demand_seed;
use crate::errors::domain::DomainError;

/// Demand of the end customer for a round. Must be deterministic per round.
pub trait DemandSchedule: Send + Sync {
    fn demand_for(&self, round: Round) -> u64;
}

impl<F> DemandSchedule for F
where
    F: Fn(Round) -> u64 + Send + Sync,
{
    fn demand_for(&self, round: Round) -> u64 {
        self(round)
    }
}

/// Configurable demand curves. Rounds are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum DemandStyle {
    Constant {
        value: u64,
    },
    /// `initial` until `at_round`, `stepped` from `at_round` on.
    Step {
        initial: u64,
        stepped: u64,
        at_round: Round,
    },
    Linear {
        start: u64,
        increase: u64,
    },
    Multiplication {
        start: u64,
        factor: u64,
    },
    /// `start * floor(modulator * e^power)^(round - 1)`.
    Exponential {
        start: u64,
        power: i32,
        modulator: u64,
    },
    /// Past the end the last value repeats.
    List {
        values: Vec<u64>,
    },
    /// Uniform in `min..=max`; `seed` defaults to the game seed.
    Random {
        min: u64,
        max: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

impl Default for DemandStyle {
    /// Classic step from 4 to 8 units in round 5.
    fn default() -> Self {
        DemandStyle::Step {
            initial: 4,
            stepped: 8,
            at_round: 5,
        }
    }
}

impl DemandStyle {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            DemandStyle::List { values } if values.is_empty() => Err(
                DomainError::configuration("demand list must contain at least one value"),
            ),
            DemandStyle::Random { min, max, .. } if min > max => Err(DomainError::configuration(
                format!("random demand range is empty: min {min} > max {max}"),
            )),
            _ => Ok(()),
        }
    }

    /// Bind the style to a game. `game_seed` is only used by `Random` without a seed.
    pub fn schedule(self, game_seed: u64) -> Result<StyledDemand, DomainError> {
        self.validate()?;
        Ok(StyledDemand {
            style: self,
            game_seed,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StyledDemand {
    style: DemandStyle,
    game_seed: u64,
}

impl DemandSchedule for StyledDemand {
    fn demand_for(&self, round: Round) -> u64 {
        let step = round.saturating_sub(1);
        match &self.style {
            DemandStyle::Constant { value } => *value,
            DemandStyle::Step {
                initial,
                stepped,
                at_round,
            } => {
                if round >= *at_round {
                    *stepped
                } else {
                    *initial
                }
            }
            DemandStyle::Linear { start, increase } => {
                start.saturating_add(increase.saturating_mul(step as u64))
            }
            DemandStyle::Multiplication { start, factor } => {
                start.saturating_mul(factor.saturating_pow(step))
            }
            DemandStyle::Exponential {
                start,
                power,
                modulator,
            } => {
                let factor = (*modulator as f64 * std::f64::consts::E.powi(*power)) as u64;
                start.saturating_mul(factor.saturating_pow(step))
            }
            DemandStyle::List { values } => values
                .get(step as usize)
                .or_else(|| values.last())
                .copied()
                .unwrap_or(0),
            DemandStyle::Random { min, max, seed } => {
                let base = seed.unwrap_or(self.game_seed);
                let mut rng = ChaCha8Rng::seed_from_u64(derive_demand_seed(base, round));
                rng.random_range(*min..=*max)
            }
        }
    }
}
