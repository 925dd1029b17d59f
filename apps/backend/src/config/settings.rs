//! Per-game settings supplied when a session is created.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::PolicyKind;
use crate::domain::budget::Budget;
use crate::domain::demand::DemandStyle;
use crate::domain::events::{ScriptedEvent, SettingsChange};
use crate::domain::flow::CostRates;
use crate::domain::roles::{GameId, Round};
use crate::domain::seed_derivation::derive_game_seed;
use crate::errors::domain::DomainError;

pub const DEFAULT_MAX_ROUNDS: Round = 36;

/// Missing fields take their defaults, so `{}` is a valid settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// The game ends once this many rounds are resolved.
    pub max_rounds: Round,
    /// Round deadline; `None` waits for every expected player.
    pub round_timeout_ms: Option<u64>,
    pub holding_cost: u64,
    pub backlog_cost: u64,
    pub demand: DemandStyle,
    pub computer_policy: PolicyKind,
    /// Seed for random demand and policies; derived from the game id when absent.
    pub policy_seed: Option<u64>,
    /// Per-round cap on the producing role's output, as a schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<DemandStyle>,
    /// Money accounting; orders are free when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ScriptedEvent>,
}

impl Default for GameSettings {
    fn default() -> Self {
        let costs = CostRates::default();
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            round_timeout_ms: None,
            holding_cost: costs.holding,
            backlog_cost: costs.backlog,
            demand: DemandStyle::default(),
            computer_policy: PolicyKind::default(),
            policy_seed: None,
            supply: None,
            budget: None,
            events: Vec::new(),
        }
    }
}

impl GameSettings {
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let settings: GameSettings = serde_json::from_str(raw)
            .map_err(|e| DomainError::configuration(format!("invalid game settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_rounds == 0 {
            return Err(DomainError::configuration("max_rounds must be at least 1"));
        }
        if self.round_timeout_ms == Some(0) {
            return Err(DomainError::configuration(
                "round_timeout_ms must be positive when set",
            ));
        }
        self.demand.validate()?;
        if let Some(supply) = &self.supply {
            supply.validate()?;
        }
        if let Some(budget) = &self.budget {
            budget.validate()?;
        }
        for event in &self.events {
            event.validate()?;
        }
        self.computer_policy.validate()
    }

    /// Overwrite the fields a scripted event changes.
    pub fn apply(&mut self, change: &SettingsChange) {
        if let Some(holding) = change.holding_cost {
            self.holding_cost = holding;
        }
        if let Some(backlog) = change.backlog_cost {
            self.backlog_cost = backlog;
        }
        if let Some(timeout) = change.round_timeout_ms {
            self.round_timeout_ms = Some(timeout);
        }
        if let Some(demand) = &change.demand {
            self.demand = demand.clone();
        }
        if let Some(supply) = &change.supply {
            self.supply = Some(supply.clone());
        }
    }

    pub fn round_timeout(&self) -> Option<Duration> {
        self.round_timeout_ms.map(Duration::from_millis)
    }

    pub fn cost_rates(&self) -> CostRates {
        CostRates {
            holding: self.holding_cost,
            backlog: self.backlog_cost,
        }
    }

    pub fn game_seed(&self, game_id: GameId) -> u64 {
        self.policy_seed.unwrap_or_else(|| derive_game_seed(game_id))
    }
}
