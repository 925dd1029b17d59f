//! End-of-game statistics derived from the snapshot history.

use serde::{Deserialize, Serialize};

use crate::domain::roles::{GameId, Position, Round};
use crate::domain::snapshot::RoundSnapshot;

/// Per-role time series over the resolved rounds (round 0 excluded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSeries {
    pub position: Position,
    pub name: String,
    pub inventory: Vec<u64>,
    pub backlog: Vec<u64>,
    pub orders_placed: Vec<u64>,
    pub shipments_sent: Vec<u64>,
    pub total_cost: u64,
    /// Variance of placed orders over variance of customer demand.
    ///
    /// `None` when customer demand never varied.
    pub amplification: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: GameId,
    pub rounds_played: Round,
    pub customer_demand: Vec<u64>,
    pub total_cost: u64,
    pub roles: Vec<RoleSeries>,
}

impl GameSummary {
    /// Build from a history ordered by round. An empty history yields an empty summary.
    pub fn from_history(game_id: GameId, history: &[RoundSnapshot]) -> Self {
        let resolved: Vec<&RoundSnapshot> = history.iter().filter(|s| s.round > 0).collect();
        let customer_demand: Vec<u64> = resolved.iter().map(|s| s.aggregate_demand).collect();
        let demand_variance = variance(&customer_demand);

        let role_count = history.last().map(|s| s.roles.len()).unwrap_or(0);
        let roles = (0..role_count)
            .map(|idx| {
                let states: Vec<_> = resolved.iter().filter_map(|s| s.roles.get(idx)).collect();
                let orders_placed: Vec<u64> = states.iter().map(|r| r.order_placed).collect();
                let amplification = match (variance(&orders_placed), demand_variance) {
                    (Some(orders), Some(demand)) if demand > 0.0 => Some(orders / demand),
                    _ => None,
                };
                let last = history.last().and_then(|s| s.roles.get(idx));
                RoleSeries {
                    position: idx as Position,
                    name: last.map(|r| r.name.clone()).unwrap_or_default(),
                    inventory: states.iter().map(|r| r.inventory).collect(),
                    backlog: states.iter().map(|r| r.backlog).collect(),
                    orders_placed,
                    shipments_sent: states.iter().map(|r| r.shipment_sent).collect(),
                    total_cost: last.map(|r| r.cumulative_cost).unwrap_or(0),
                    amplification,
                }
            })
            .collect();

        GameSummary {
            game_id,
            rounds_played: resolved.last().map(|s| s.round).unwrap_or(0),
            customer_demand,
            total_cost: history.last().map(|s| s.total_cost()).unwrap_or(0),
            roles,
        }
    }
}

/// Population variance; `None` for an empty series.
fn variance(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|v| *v as f64).sum::<f64>() / n;
    Some(
        values
            .iter()
            .map(|v| {
                let d = *v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n,
    )
}
