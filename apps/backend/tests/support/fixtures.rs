//! Shared game setups for integration tests.

use std::sync::Arc;

use backend_test_support::unique_ids::unique_players;
use supply_chain_backend::domain::{DemandStyle, PlayerAssignment, RoleTopology, Round};
use supply_chain_backend::{GameSessionCoordinator, GameSettings, InMemorySnapshotStore};

use super::RecordingSink;

pub struct Harness {
    pub coordinator: GameSessionCoordinator,
    pub store: Arc<InMemorySnapshotStore>,
    pub sink: Arc<RecordingSink>,
}

/// Coordinator over a fresh in-memory store and recording sink.
pub fn harness(defaults: GameSettings) -> Harness {
    let store = Arc::new(InMemorySnapshotStore::new());
    let sink = Arc::new(RecordingSink::new());
    let coordinator = GameSessionCoordinator::new(store.clone(), sink.clone(), defaults);
    Harness {
        coordinator,
        store,
        sink,
    }
}

/// Constant customer demand, default costs and mirror-demand computers.
pub fn constant_settings(demand: u64, max_rounds: Round) -> GameSettings {
    GameSettings {
        max_rounds,
        demand: DemandStyle::Constant { value: demand },
        ..GameSettings::default()
    }
}

/// Retailer, wholesaler, factory with a one-round delay.
pub fn three_stage(initial_inventory: i64) -> RoleTopology {
    RoleTopology::chain(&["Retailer", "Wholesaler", "Factory"], initial_inventory, 1)
        .expect("three-stage topology")
}

/// Fresh players seated at the first `count` positions.
pub fn seats(count: usize) -> Vec<PlayerAssignment> {
    unique_players(count)
        .into_iter()
        .enumerate()
        .map(|(position, player)| PlayerAssignment::new(player, position as u8))
        .collect()
}
