//! Game id → live session registry.
//!
//! The map only hands out `Arc<SessionHandle>` clones; no map guard is held
//! across an await, so one busy session never blocks another.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::config::settings::GameSettings;
use crate::domain::assignment::{Assignments, PlayerAssignment};
use crate::domain::order_book::Order;
use crate::domain::roles::{GameId, PlayerId, Round};
use crate::domain::snapshot::RoundSnapshot;
use crate::domain::stats::GameSummary;
use crate::domain::topology::RoleTopology;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::snapshots::SnapshotStore;
use crate::services::session::{
    RoundPhase, SessionDeps, SessionHandle, SessionStrategies,
};
use crate::ws::hub::EventSink;
use crate::ws::protocol::GameEvent;

pub struct GameSessionCoordinator {
    sessions: DashMap<GameId, Arc<SessionHandle>>,
    deps: SessionDeps,
    defaults: GameSettings,
}

impl GameSessionCoordinator {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        events: Arc<dyn EventSink>,
        defaults: GameSettings,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            deps: SessionDeps { store, events },
            defaults,
        }
    }

    pub fn defaults(&self) -> &GameSettings {
        &self.defaults
    }

    /// Start a game with the coordinator's default settings.
    pub async fn create_session(
        &self,
        game_id: GameId,
        topology: RoleTopology,
        players: Vec<PlayerAssignment>,
    ) -> Result<(), AppError> {
        self.create_session_with_settings(game_id, topology, players, self.defaults.clone())
            .await
    }

    pub async fn create_session_with_settings(
        &self,
        game_id: GameId,
        topology: RoleTopology,
        players: Vec<PlayerAssignment>,
        settings: GameSettings,
    ) -> Result<(), AppError> {
        settings.validate()?;
        let strategies = SessionStrategies::from_settings(&settings, settings.game_seed(game_id))?;
        self.create_session_with(game_id, topology, players, settings, strategies)
            .await
    }

    /// Start a game with explicitly injected demand and policy strategies.
    pub async fn create_session_with(
        &self,
        game_id: GameId,
        topology: RoleTopology,
        players: Vec<PlayerAssignment>,
        settings: GameSettings,
        strategies: SessionStrategies,
    ) -> Result<(), AppError> {
        settings.validate()?;
        let assignments = Assignments::new(players, &topology)?;
        if let Some(budget) = &settings.budget {
            budget.check_positions(&topology)?;
        }
        let handle = SessionHandle::create(
            game_id,
            self.deps.clone(),
            topology,
            assignments,
            settings,
            strategies,
        );
        self.register(game_id, handle.clone())?;

        if let Err(e) = handle.start().await {
            warn!(game_id = %game_id, error = %e, "Session failed to start; discarding");
            self.sessions.remove(&game_id);
            return Err(e);
        }
        info!(game_id = %game_id, "Session created");
        Ok(())
    }

    /// Rebuild a session from the store and reopen the round after the latest snapshot.
    pub async fn restore_session(
        &self,
        game_id: GameId,
        players: Vec<PlayerAssignment>,
        settings: Option<GameSettings>,
    ) -> Result<(), AppError> {
        if self.sessions.contains_key(&game_id) {
            return Err(session_exists(game_id));
        }
        let settings = settings.unwrap_or_else(|| self.defaults.clone());
        settings.validate()?;
        let strategies = SessionStrategies::from_settings(&settings, settings.game_seed(game_id))?;
        let handle =
            SessionHandle::restore(game_id, self.deps.clone(), players, settings, strategies)
                .await?;
        self.register(game_id, handle.clone())?;
        handle.resume().await;
        info!(game_id = %game_id, "Session restored");
        Ok(())
    }

    fn register(&self, game_id: GameId, handle: Arc<SessionHandle>) -> Result<(), AppError> {
        match self.sessions.entry(game_id) {
            Entry::Occupied(_) => Err(session_exists(game_id)),
            Entry::Vacant(slot) => {
                slot.insert(handle);
                Ok(())
            }
        }
    }

    fn session(&self, game_id: GameId) -> Result<Arc<SessionHandle>, AppError> {
        self.sessions
            .get(&game_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::unknown_game(game_id))
    }

    /// Submit an order for the open round.
    pub async fn submit_order(
        &self,
        game_id: GameId,
        player: PlayerId,
        quantity: i64,
    ) -> Result<Order, AppError> {
        self.submit(game_id, player, None, quantity).await
    }

    /// Submit an order for an explicit round; any round but the open one is closed.
    pub async fn submit_order_for_round(
        &self,
        game_id: GameId,
        player: PlayerId,
        round: Round,
        quantity: i64,
    ) -> Result<Order, AppError> {
        self.submit(game_id, player, Some(round), quantity).await
    }

    async fn submit(
        &self,
        game_id: GameId,
        player: PlayerId,
        round: Option<Round>,
        quantity: i64,
    ) -> Result<Order, AppError> {
        let result = match self.session(game_id) {
            Ok(handle) => handle.submit_order(player, round, quantity).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            if e.is_recoverable() {
                debug!(game_id = %game_id, %player, code = %e.code(), "Order rejected");
                self.deps.events.publish(GameEvent::OrderRejected {
                    game_id,
                    player,
                    round,
                    code: e.code(),
                    reason: e.detail().to_string(),
                });
            }
        }
        result
    }

    pub async fn get_snapshot(&self, game_id: GameId, round: Round) -> Result<RoundSnapshot, AppError> {
        let handle = self.session(game_id)?;
        if let Some(snapshot) = handle.snapshot(round).await {
            return Ok(snapshot);
        }
        // Older rounds of a restored game may only exist in the store.
        self.deps
            .store
            .load_snapshot(game_id, round)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Snapshot,
                    format!("Game {game_id} has no snapshot for round {round}"),
                )
                .into()
            })
    }

    pub async fn latest_snapshot(&self, game_id: GameId) -> Result<RoundSnapshot, AppError> {
        let handle = self.session(game_id)?;
        handle.latest_snapshot().await.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Snapshot,
                format!("Game {game_id} has no snapshots"),
            )
            .into()
        })
    }

    pub async fn phase(&self, game_id: GameId) -> Result<RoundPhase, AppError> {
        Ok(self.session(game_id)?.phase().await)
    }

    /// Resolve the open round now, as if its deadline had fired.
    pub async fn expire_round(&self, game_id: GameId) -> Result<RoundSnapshot, AppError> {
        self.session(game_id)?.expire_round().await
    }

    pub async fn retry_resolution(&self, game_id: GameId) -> Result<RoundSnapshot, AppError> {
        self.session(game_id)?.retry_resolution().await
    }

    pub async fn player_connected(&self, game_id: GameId, player: PlayerId) -> Result<(), AppError> {
        self.session(game_id)?.set_presence(player, true).await
    }

    pub async fn player_disconnected(
        &self,
        game_id: GameId,
        player: PlayerId,
    ) -> Result<(), AppError> {
        self.session(game_id)?.set_presence(player, false).await
    }

    /// End the game but keep the session readable.
    pub async fn terminate(&self, game_id: GameId) -> Result<RoundPhase, AppError> {
        Ok(self.session(game_id)?.terminate().await)
    }

    pub async fn summary(&self, game_id: GameId) -> Result<GameSummary, AppError> {
        Ok(self.session(game_id)?.summary().await)
    }

    /// Destroy the session, terminating it first if it is still running.
    pub async fn end_session(&self, game_id: GameId) -> Result<GameSummary, AppError> {
        let (_, handle) = self
            .sessions
            .remove(&game_id)
            .ok_or_else(|| AppError::unknown_game(game_id))?;
        handle.terminate().await;
        info!(game_id = %game_id, "Session removed");
        Ok(handle.summary().await)
    }

    pub fn is_live(&self, game_id: GameId) -> bool {
        self.sessions.contains_key(&game_id)
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }
}

fn session_exists(game_id: GameId) -> AppError {
    DomainError::conflict(
        ConflictKind::SessionExists,
        format!("Game {game_id} already has a live session"),
    )
    .into()
}
