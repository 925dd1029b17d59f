//! Computer policy configuration.
//!
//! Stored inside game settings as a tagged object, e.g.
//! `{"kind": "base_stock", "target": 16}`.

use serde::{Deserialize, Serialize};

use crate::errors::domain::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyKind {
    Fixed { quantity: u64 },
    #[default]
    MirrorDemand,
    BaseStock { target: u64 },
    Random { min: u64, max: u64 },
}

impl PolicyKind {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            PolicyKind::Random { min, max } if min > max => Err(DomainError::configuration(
                format!("random policy range is empty: min {min} > max {max}"),
            )),
            _ => Ok(()),
        }
    }
}
