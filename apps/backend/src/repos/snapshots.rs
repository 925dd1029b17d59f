//! Snapshot repository trait for the round engine.
//!
//! Persistence technology is up to the adapter. Saves are idempotent by
//! (game, round): saving the same round again overwrites it.

use async_trait::async_trait;

use crate::domain::roles::{GameId, Round};
use crate::domain::snapshot::RoundSnapshot;
use crate::domain::topology::RoleTopology;
use crate::errors::domain::DomainError;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save_topology(
        &self,
        game_id: GameId,
        topology: &RoleTopology,
    ) -> Result<(), DomainError>;

    /// `NotFound(Topology)` when nothing was saved for the game.
    async fn load_topology(&self, game_id: GameId) -> Result<RoleTopology, DomainError>;

    async fn save_snapshot(
        &self,
        game_id: GameId,
        snapshot: &RoundSnapshot,
    ) -> Result<(), DomainError>;

    async fn load_snapshot(
        &self,
        game_id: GameId,
        round: Round,
    ) -> Result<Option<RoundSnapshot>, DomainError>;

    async fn load_latest_snapshot(
        &self,
        game_id: GameId,
    ) -> Result<Option<RoundSnapshot>, DomainError>;

    /// All snapshots of the game ordered by round.
    async fn load_history(&self, game_id: GameId) -> Result<Vec<RoundSnapshot>, DomainError>;
}
