use std::env;
use std::str::FromStr;

use crate::config::settings::{GameSettings, DEFAULT_MAX_ROUNDS};
use crate::domain::budget::Budget;
use crate::domain::flow::CostRates;
use crate::domain::roles::Round;
use crate::domain::topology::{RoleTopology, CLASSIC_ROLES, DEFAULT_TRANSIT_DELAY};
use crate::error::AppError;

pub const DEFAULT_INITIAL_INVENTORY: i64 = 12;
pub const DEFAULT_DEMO_PLAYERS: u8 = 1;

/// Process-wide defaults read from `CHAIN_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_rounds: Round,
    /// 0 disables round deadlines.
    pub round_timeout_ms: u64,
    pub transit_delay: u32,
    pub initial_inventory: i64,
    pub holding_cost: u64,
    pub backlog_cost: u64,
    /// Human seats in the demo game, filled from the retailer upstream.
    pub demo_players: u8,
    /// 0 plays without money accounting.
    pub start_money: u64,
    pub unit_price: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let costs = CostRates::default();
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            round_timeout_ms: 0,
            transit_delay: DEFAULT_TRANSIT_DELAY,
            initial_inventory: DEFAULT_INITIAL_INVENTORY,
            holding_cost: costs.holding,
            backlog_cost: costs.backlog,
            demo_players: DEFAULT_DEMO_PLAYERS,
            start_money: 0,
            unit_price: 1,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let config = Self {
            max_rounds: var_or("CHAIN_MAX_ROUNDS", defaults.max_rounds)?,
            round_timeout_ms: var_or("CHAIN_ROUND_TIMEOUT_MS", defaults.round_timeout_ms)?,
            transit_delay: var_or("CHAIN_TRANSIT_DELAY", defaults.transit_delay)?,
            initial_inventory: var_or("CHAIN_INITIAL_INVENTORY", defaults.initial_inventory)?,
            holding_cost: var_or("CHAIN_HOLDING_COST", defaults.holding_cost)?,
            backlog_cost: var_or("CHAIN_BACKLOG_COST", defaults.backlog_cost)?,
            demo_players: var_or("CHAIN_DEMO_PLAYERS", defaults.demo_players)?,
            start_money: var_or("CHAIN_START_MONEY", defaults.start_money)?,
            unit_price: var_or("CHAIN_UNIT_PRICE", defaults.unit_price)?,
        };
        if config.demo_players as usize > CLASSIC_ROLES.len() {
            return Err(AppError::config(format!(
                "CHAIN_DEMO_PLAYERS must be at most {}, got {}",
                CLASSIC_ROLES.len(),
                config.demo_players
            )));
        }
        Ok(config)
    }

    /// Settings for sessions created without explicit settings.
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            max_rounds: self.max_rounds,
            round_timeout_ms: (self.round_timeout_ms > 0).then_some(self.round_timeout_ms),
            holding_cost: self.holding_cost,
            backlog_cost: self.backlog_cost,
            budget: (self.start_money > 0).then(|| Budget::new(self.start_money, self.unit_price)),
            ..GameSettings::default()
        }
    }

    /// Classic four-role chain with the configured stock and delay.
    pub fn topology(&self) -> Result<RoleTopology, AppError> {
        Ok(RoleTopology::chain(
            &CLASSIC_ROLES,
            self.initial_inventory,
            self.transit_delay,
        )?)
    }
}

fn var_or<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            AppError::config(format!(
                "Environment variable '{name}' has invalid value '{raw}': {e}"
            ))
        }),
        Err(_) => Ok(default),
    }
}
