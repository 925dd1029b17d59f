//! Live game session - the round state machine of one game.
//!
//! A session owns the topology, assignments, the open order book and the
//! snapshot history. Every mutation goes through the per-session async mutex,
//! so submissions, completion checks, deadlines and resolution of one game are
//! serialized while different games never contend.

mod deadlines;
mod player_actions;
mod round_lifecycle;
mod scripted_events;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::ai::{create_policy, ComputerPolicy};
use crate::config::settings::GameSettings;
use crate::domain::assignment::Assignments;
use crate::domain::demand::DemandSchedule;
use crate::domain::events::{apply_adjustments, ResourceAdjustment, SettingsChange};
use crate::domain::order_book::OrderBook;
use crate::domain::roles::{GameId, PlayerId, Position, Round};
use crate::domain::snapshot::RoundSnapshot;
use crate::domain::topology::RoleTopology;
use crate::errors::domain::{DomainError, InvariantKind};
use crate::repos::snapshots::SnapshotStore;
use crate::ws::hub::EventSink;
use crate::ws::protocol::EndReason;

/// Collaborators shared by every session of a coordinator.
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Arc<dyn SnapshotStore>,
    pub events: Arc<dyn EventSink>,
}

/// Injected strategies for customer demand, producer supply and computer orders.
#[derive(Clone)]
pub struct SessionStrategies {
    pub demand: Arc<dyn DemandSchedule>,
    pub policy: Arc<dyn ComputerPolicy>,
    /// Per-round cap on production; unlimited when `None`.
    pub supply: Option<Arc<dyn DemandSchedule>>,
}

impl SessionStrategies {
    pub fn from_settings(settings: &GameSettings, game_seed: u64) -> Result<Self, DomainError> {
        let demand = settings.demand.clone().schedule(game_seed)?;
        settings.computer_policy.validate()?;
        let supply = match &settings.supply {
            Some(style) => Some(Arc::new(style.clone().schedule(game_seed)?) as Arc<dyn DemandSchedule>),
            None => None,
        };
        Ok(Self {
            demand: Arc::new(demand),
            policy: create_policy(&settings.computer_policy),
            supply,
        })
    }
}

/// Lifecycle of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RoundPhase {
    /// Accepting orders for `round`.
    Open { round: Round },
    /// Book closed; snapshot not yet persisted. Stays here when resolution fails.
    Resolving { round: Round },
    /// Snapshot for `round` persisted; the next round is not open yet.
    Closed { round: Round },
    Ended { reason: EndReason, last_round: Round },
}

impl RoundPhase {
    pub fn is_ended(&self) -> bool {
        matches!(self, RoundPhase::Ended { .. })
    }
}

pub(crate) struct GameSession {
    topology: RoleTopology,
    assignments: Assignments,
    settings: GameSettings,
    strategies: SessionStrategies,
    game_seed: u64,
    phase: RoundPhase,
    book: OrderBook,
    /// Round 0 first; index == round.
    history: Vec<RoundSnapshot>,
    disconnected: BTreeSet<PlayerId>,
    deadline: Option<CancellationToken>,
    /// Scripted adjustments for the open round, applied when it resolves.
    adjustments: Vec<ResourceAdjustment>,
    /// Set when resolution failed on a broken invariant; retrying is refused.
    aborted: Option<DomainError>,
}

impl GameSession {
    fn expected_players(&self) -> Vec<PlayerId> {
        self.assignments
            .players()
            .filter(|p| !self.disconnected.contains(p))
            .collect()
    }

    fn book_complete(&self) -> bool {
        self.book.is_complete(self.expected_players())
    }

    /// The open round may resolve without a deadline or an explicit expiry.
    ///
    /// A game with seats but nobody connected waits instead of playing
    /// itself to the end.
    fn auto_resolvable(&self) -> bool {
        let nobody_present = !self.assignments.is_empty() && self.expected_players().is_empty();
        !nobody_present && self.book_complete()
    }

    /// Latest snapshot with the open round's adjustments applied.
    fn opening_snapshot(&self) -> Result<RoundSnapshot, DomainError> {
        let mut snapshot = self.latest().cloned().ok_or_else(|| {
            DomainError::invariant(
                InvariantKind::Other("no snapshot".into()),
                "Session has no snapshot to open a round from",
            )
        })?;
        apply_adjustments(&mut snapshot, &self.adjustments)?;
        Ok(snapshot)
    }

    /// Money `position` can still spend in the open round.
    fn available_money(&self, position: Position) -> Result<u64, DomainError> {
        let snapshot = self.opening_snapshot()?;
        Ok(snapshot.role(position).map(|r| r.money).unwrap_or(0))
    }

    /// Apply a scripted settings change, rebuilding the schedules it replaces.
    fn apply_settings_change(&mut self, change: &SettingsChange) -> Result<(), DomainError> {
        let mut next = self.settings.clone();
        next.apply(change);
        next.validate()?;
        if change.demand.is_some() {
            self.strategies.demand = Arc::new(next.demand.clone().schedule(self.game_seed)?);
        }
        if let Some(style) = &change.supply {
            self.strategies.supply = Some(Arc::new(style.clone().schedule(self.game_seed)?));
        }
        self.settings = next;
        Ok(())
    }

    fn latest(&self) -> Option<&RoundSnapshot> {
        self.history.last()
    }

    fn cancel_deadline(&mut self) {
        if let Some(token) = self.deadline.take() {
            token.cancel();
        }
    }
}

/// Shared handle to one live session.
pub struct SessionHandle {
    game_id: GameId,
    deps: SessionDeps,
    session: Mutex<GameSession>,
}

impl SessionHandle {
    pub fn game_id(&self) -> GameId {
        self.game_id
    }
}
