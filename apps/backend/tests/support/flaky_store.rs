//! Snapshot store that fails a configurable number of snapshot writes and
//! can report a stale latest snapshot.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use supply_chain_backend::domain::{GameId, RoleTopology, Round, RoundSnapshot};
use supply_chain_backend::errors::domain::{DomainError, InfraErrorKind};
use supply_chain_backend::{InMemorySnapshotStore, SnapshotStore};

pub struct FlakyStore {
    inner: Arc<InMemorySnapshotStore>,
    failures_left: AtomicUsize,
    stale_latest: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<InMemorySnapshotStore>) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(0),
            stale_latest: AtomicBool::new(false),
        }
    }

    /// The next `count` snapshot writes fail with `StoreUnavailable`.
    pub fn fail_next_writes(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// `load_latest_snapshot` answers with the round before the real latest.
    pub fn serve_stale_latest(&self) {
        self.stale_latest.store(true, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SnapshotStore for FlakyStore {
    async fn save_topology(
        &self,
        game_id: GameId,
        topology: &RoleTopology,
    ) -> Result<(), DomainError> {
        self.inner.save_topology(game_id, topology).await
    }

    async fn load_topology(&self, game_id: GameId) -> Result<RoleTopology, DomainError> {
        self.inner.load_topology(game_id).await
    }

    async fn save_snapshot(
        &self,
        game_id: GameId,
        snapshot: &RoundSnapshot,
    ) -> Result<(), DomainError> {
        if self.take_failure() {
            return Err(DomainError::infra(
                InfraErrorKind::StoreUnavailable,
                format!("injected failure writing round {}", snapshot.round),
            ));
        }
        self.inner.save_snapshot(game_id, snapshot).await
    }

    async fn load_snapshot(
        &self,
        game_id: GameId,
        round: Round,
    ) -> Result<Option<RoundSnapshot>, DomainError> {
        self.inner.load_snapshot(game_id, round).await
    }

    async fn load_latest_snapshot(
        &self,
        game_id: GameId,
    ) -> Result<Option<RoundSnapshot>, DomainError> {
        let latest = self.inner.load_latest_snapshot(game_id).await?;
        match latest {
            Some(snapshot) if self.stale_latest.load(Ordering::SeqCst) && snapshot.round > 0 => {
                self.inner.load_snapshot(game_id, snapshot.round - 1).await
            }
            other => Ok(other),
        }
    }

    async fn load_history(&self, game_id: GameId) -> Result<Vec<RoundSnapshot>, DomainError> {
        self.inner.load_history(game_id).await
    }
}
