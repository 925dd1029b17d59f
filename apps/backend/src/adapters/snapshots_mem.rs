//! In-memory adapter for the snapshot repository.
//!
//! Stores the canonical encodings rather than the values, so every load goes
//! through the same versioned decoding as a durable store would.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::roles::{GameId, Round};
use crate::domain::snapshot::RoundSnapshot;
use crate::domain::topology::RoleTopology;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};
use crate::repos::snapshots::SnapshotStore;

#[derive(Debug, Default)]
struct StoredGame {
    topology: Option<Vec<u8>>,
    snapshots: BTreeMap<Round, Vec<u8>>,
    writes: BTreeMap<Round, usize>,
}

#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    games: RwLock<HashMap<GameId, StoredGame>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times a snapshot for `round` was written.
    pub fn snapshot_writes(&self, game_id: GameId, round: Round) -> usize {
        self.games
            .read()
            .get(&game_id)
            .and_then(|g| g.writes.get(&round).copied())
            .unwrap_or(0)
    }

    pub fn snapshot_count(&self, game_id: GameId) -> usize {
        self.games
            .read()
            .get(&game_id)
            .map(|g| g.snapshots.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save_topology(
        &self,
        game_id: GameId,
        topology: &RoleTopology,
    ) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec(topology).map_err(|e| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Failed to encode topology for game {game_id}: {e}"),
            )
        })?;
        self.games.write().entry(game_id).or_default().topology = Some(bytes);
        Ok(())
    }

    async fn load_topology(&self, game_id: GameId) -> Result<RoleTopology, DomainError> {
        let bytes = self
            .games
            .read()
            .get(&game_id)
            .and_then(|g| g.topology.clone())
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Topology,
                    format!("No topology stored for game {game_id}"),
                )
            })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Stored topology for game {game_id} is unreadable: {e}"),
            )
        })
    }

    async fn save_snapshot(
        &self,
        game_id: GameId,
        snapshot: &RoundSnapshot,
    ) -> Result<(), DomainError> {
        let bytes = snapshot.encode()?;
        let mut games = self.games.write();
        let game = games.entry(game_id).or_default();
        game.snapshots.insert(snapshot.round, bytes);
        *game.writes.entry(snapshot.round).or_default() += 1;
        Ok(())
    }

    async fn load_snapshot(
        &self,
        game_id: GameId,
        round: Round,
    ) -> Result<Option<RoundSnapshot>, DomainError> {
        let bytes = self
            .games
            .read()
            .get(&game_id)
            .and_then(|g| g.snapshots.get(&round).cloned());
        bytes.map(|b| RoundSnapshot::decode(&b)).transpose()
    }

    async fn load_latest_snapshot(
        &self,
        game_id: GameId,
    ) -> Result<Option<RoundSnapshot>, DomainError> {
        let bytes = self
            .games
            .read()
            .get(&game_id)
            .and_then(|g| g.snapshots.values().next_back().cloned());
        bytes.map(|b| RoundSnapshot::decode(&b)).transpose()
    }

    async fn load_history(&self, game_id: GameId) -> Result<Vec<RoundSnapshot>, DomainError> {
        let encoded: Vec<Vec<u8>> = self
            .games
            .read()
            .get(&game_id)
            .map(|g| g.snapshots.values().cloned().collect())
            .unwrap_or_default();
        encoded.iter().map(|b| RoundSnapshot::decode(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> GameId {
        GameId::from_u128(5)
    }

    #[tokio::test]
    async fn topology_roundtrip_and_missing() {
        let store = InMemorySnapshotStore::new();
        assert!(matches!(
            store.load_topology(game()).await,
            Err(DomainError::NotFound(NotFoundKind::Topology, _))
        ));

        let topology = RoleTopology::classic(12).unwrap();
        store.save_topology(game(), &topology).await.unwrap();
        assert_eq!(store.load_topology(game()).await.unwrap(), topology);
    }

    #[tokio::test]
    async fn saves_overwrite_by_round() {
        let store = InMemorySnapshotStore::new();
        let topology = RoleTopology::classic(12).unwrap();
        let mut snapshot = topology.initial_snapshot(game());
        store.save_snapshot(game(), &snapshot).await.unwrap();

        snapshot.round = 1;
        store.save_snapshot(game(), &snapshot).await.unwrap();
        snapshot.roles[0].inventory = 3;
        store.save_snapshot(game(), &snapshot).await.unwrap();

        assert_eq!(store.snapshot_count(game()), 2);
        assert_eq!(store.snapshot_writes(game(), 1), 2);
        let latest = store.load_latest_snapshot(game()).await.unwrap().unwrap();
        assert_eq!(latest.round, 1);
        assert_eq!(latest.roles[0].inventory, 3);

        let history = store.load_history(game()).await.unwrap();
        assert_eq!(history.iter().map(|s| s.round).collect::<Vec<_>>(), vec![0, 1]);
        assert!(store.load_snapshot(game(), 7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_games_have_no_snapshots() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load_latest_snapshot(game()).await.unwrap().is_none());
        assert!(store.load_history(game()).await.unwrap().is_empty());
    }
}
