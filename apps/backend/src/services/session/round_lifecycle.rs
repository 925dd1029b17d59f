use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{deadlines, GameSession, RoundPhase, SessionDeps, SessionHandle, SessionStrategies};
use crate::ai::{choose_or_mirror, PolicyContext};
use crate::config::settings::GameSettings;
use crate::domain::assignment::{Assignments, PlayerAssignment};
use crate::domain::flow::{FlowResolver, RoundInputs};
use crate::domain::order_book::{OrderBook, OrderSource, RoleOrders};
use crate::domain::roles::{GameId, Round};
use crate::domain::snapshot::RoundSnapshot;
use crate::domain::stats::GameSummary;
use crate::domain::topology::RoleTopology;
use crate::error::AppError;
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, InvariantKind, NotFoundKind,
};
use crate::ws::protocol::{EndReason, GameEvent};

impl SessionHandle {
    /// Build a fresh session at round 0. Nothing is persisted or published
    /// until [`SessionHandle::start`].
    pub(crate) fn create(
        game_id: GameId,
        deps: SessionDeps,
        topology: RoleTopology,
        assignments: Assignments,
        settings: GameSettings,
        strategies: SessionStrategies,
    ) -> Arc<Self> {
        let mut initial = topology.initial_snapshot(game_id);
        if let Some(budget) = &settings.budget {
            budget.fund(&mut initial);
        }
        Self::build(game_id, deps, topology, assignments, settings, strategies, vec![initial])
    }

    /// Rebuild a session from the store: topology plus full snapshot history.
    ///
    /// The history must run from round 0 without gaps and end at the store's
    /// latest snapshot. Settings changes made by scripted events are replayed.
    pub(crate) async fn restore(
        game_id: GameId,
        deps: SessionDeps,
        players: Vec<PlayerAssignment>,
        settings: GameSettings,
        strategies: SessionStrategies,
    ) -> Result<Arc<Self>, AppError> {
        let topology = deps.store.load_topology(game_id).await?;
        let assignments = Assignments::new(players, &topology)?;
        if let Some(budget) = &settings.budget {
            budget.check_positions(&topology)?;
        }
        let history = deps.store.load_history(game_id).await?;
        let stored_latest = deps.store.load_latest_snapshot(game_id).await?;

        let latest = history.last().ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Snapshot,
                format!("No snapshots stored for game {game_id}"),
            )
        })?;
        for (idx, snapshot) in history.iter().enumerate() {
            if snapshot.round as usize != idx {
                return Err(DomainError::infra(
                    InfraErrorKind::DataCorruption,
                    format!(
                        "Snapshot history of game {game_id} has a gap at round {idx}"
                    ),
                )
                .into());
            }
        }
        if stored_latest.as_ref() != Some(latest) {
            return Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!(
                    "Latest snapshot of game {game_id} does not match the end of its history (round {})",
                    latest.round
                ),
            )
            .into());
        }
        topology.check_snapshot(latest)?;

        info!(
            game_id = %game_id,
            latest_round = latest.round,
            "Restoring session from store"
        );
        let last_round = latest.round;
        let handle = Self::build(
            game_id,
            deps,
            topology,
            assignments,
            settings,
            strategies,
            history,
        );
        handle.session.lock().await.replay_settings_changes(last_round);
        Ok(handle)
    }

    fn build(
        game_id: GameId,
        deps: SessionDeps,
        topology: RoleTopology,
        assignments: Assignments,
        settings: GameSettings,
        strategies: SessionStrategies,
        history: Vec<RoundSnapshot>,
    ) -> Arc<Self> {
        let last_round = history.last().map(|s| s.round).unwrap_or(0);
        let mut book = OrderBook::open(last_round);
        book.close();
        let game_seed = settings.game_seed(game_id);
        Arc::new(Self {
            game_id,
            deps,
            session: Mutex::new(GameSession {
                topology,
                assignments,
                settings,
                strategies,
                game_seed,
                phase: RoundPhase::Closed { round: last_round },
                book,
                history,
                disconnected: Default::default(),
                deadline: None,
                adjustments: Vec::new(),
                aborted: None,
            }),
        })
    }

    /// Persist topology and round 0, then open round 1.
    pub(crate) async fn start(self: &Arc<Self>) -> Result<(), AppError> {
        let mut s = self.session.lock().await;
        let initial = s.latest().cloned().ok_or_else(|| {
            DomainError::invariant(
                InvariantKind::Other("no initial snapshot".into()),
                "Session has no round 0 snapshot",
            )
        })?;
        self.deps.store.save_topology(self.game_id, &s.topology).await?;
        self.deps.store.save_snapshot(self.game_id, &initial).await?;
        info!(
            game_id = %self.game_id,
            roles = s.topology.len(),
            players = s.assignments.len(),
            max_rounds = s.settings.max_rounds,
            "Session started"
        );
        self.resume_locked(&mut s).await;
        Ok(())
    }

    /// Open the round after the latest snapshot, or end the game if it is complete.
    pub(crate) async fn resume(self: &Arc<Self>) {
        let mut s = self.session.lock().await;
        self.resume_locked(&mut s).await;
    }

    async fn resume_locked(self: &Arc<Self>, s: &mut GameSession) {
        let last_round = s.latest().map(|snap| snap.round).unwrap_or(0);
        if last_round >= s.settings.max_rounds {
            info!(game_id = %self.game_id, last_round, "Session already at max rounds");
            self.end_game(s, EndReason::MaxRoundsReached);
            return;
        }
        self.open_round(s, last_round + 1);
        self.advance(s).await;
    }

    fn open_round(self: &Arc<Self>, s: &mut GameSession, round: Round) {
        s.book = OrderBook::open(round);
        s.phase = RoundPhase::Open { round };
        self.run_scripted_events(s, round);
        if let Some(timeout) = s.settings.round_timeout() {
            s.deadline = Some(deadlines::schedule(self, round, timeout));
        }

        let expected_players = s.expected_players();
        info!(
            game_id = %self.game_id,
            round,
            expected = expected_players.len(),
            "Round opened"
        );
        self.deps.events.publish(GameEvent::RoundOpened {
            game_id: self.game_id,
            round,
            deadline_ms: s.settings.round_timeout_ms,
            expected_players,
        });
    }

    /// Resolve rounds for as long as the open book is already complete.
    ///
    /// Stops at a round nobody is connected to. Failures are logged by
    /// `resolve_round` and leave the round in `Resolving`.
    pub(super) async fn advance(self: &Arc<Self>, s: &mut GameSession) {
        while matches!(s.phase, RoundPhase::Open { .. }) && s.auto_resolvable() {
            if self.resolve_round(s).await.is_err() {
                break;
            }
        }
    }

    /// `Open`/`Resolving` → `Closed` → next `Open` (or `Ended`).
    pub(super) async fn resolve_round(self: &Arc<Self>, s: &mut GameSession) -> Result<RoundSnapshot, AppError> {
        let round = match s.phase {
            RoundPhase::Open { round } | RoundPhase::Resolving { round } => round,
            RoundPhase::Closed { round } => {
                return Err(DomainError::conflict(
                    ConflictKind::RoundClosed,
                    format!("Round {round} is already resolved"),
                )
                .into())
            }
            RoundPhase::Ended { .. } => {
                return Err(DomainError::conflict(ConflictKind::GameEnded, "Game has ended").into())
            }
        };

        s.cancel_deadline();
        s.phase = RoundPhase::Resolving { round };
        s.book.close();
        debug!(game_id = %self.game_id, round, orders = s.book.len(), "Resolving round");

        let (orders, next) = match compute_round(self.game_id, s, round) {
            Ok(out) => out,
            Err(e) => {
                error!(
                    game_id = %self.game_id,
                    round,
                    error = %e,
                    fatal = e.is_fatal(),
                    "Round resolution aborted; round left in Resolving"
                );
                if e.is_fatal() {
                    s.aborted = Some(e.clone());
                }
                return Err(e.into());
            }
        };
        let digest = next.digest()?;

        if let Err(e) = self.deps.store.save_snapshot(self.game_id, &next).await {
            error!(
                game_id = %self.game_id,
                round,
                error = %e,
                "Persisting snapshot failed; round is retryable"
            );
            return Err(e.into());
        }

        s.phase = RoundPhase::Closed { round };
        s.history.push(next.clone());
        info!(
            game_id = %self.game_id,
            round,
            demand = next.aggregate_demand,
            supply = next.aggregate_supply,
            total_cost = next.total_cost(),
            "Round resolved"
        );
        self.deps.events.publish(GameEvent::RoundResolved {
            game_id: self.game_id,
            round,
            digest,
            orders: orders.entries,
            snapshot: next.clone(),
        });

        if round >= s.settings.max_rounds {
            self.end_game(s, EndReason::MaxRoundsReached);
        } else {
            self.open_round(s, round + 1);
        }
        Ok(next)
    }

    fn end_game(&self, s: &mut GameSession, reason: EndReason) {
        s.cancel_deadline();
        let last_round = s.latest().map(|snap| snap.round).unwrap_or(0);
        s.phase = RoundPhase::Ended { reason, last_round };
        let summary = GameSummary::from_history(self.game_id, &s.history);
        info!(
            game_id = %self.game_id,
            ?reason,
            last_round,
            total_cost = summary.total_cost,
            "Game ended"
        );
        self.deps.events.publish(GameEvent::GameEnded {
            game_id: self.game_id,
            reason,
            summary,
        });
    }

    /// Deadline callback. Ignored unless `round` is still the open round.
    pub(super) async fn on_deadline(self: &Arc<Self>, round: Round) {
        let mut s = self.session.lock().await;
        if s.phase != (RoundPhase::Open { round }) {
            debug!(game_id = %self.game_id, round, phase = ?s.phase, "Stale round deadline ignored");
            return;
        }
        let missing = s.book.missing(s.expected_players());
        info!(
            game_id = %self.game_id,
            round,
            missing = missing.len(),
            "Round deadline elapsed"
        );
        if self.resolve_round(&mut s).await.is_ok() {
            self.advance(&mut s).await;
        }
    }

    /// Close the open round now, filling missing orders by policy.
    pub async fn expire_round(self: &Arc<Self>) -> Result<RoundSnapshot, AppError> {
        let mut s = self.session.lock().await;
        match s.phase {
            RoundPhase::Open { round } => {
                info!(game_id = %self.game_id, round, "Round expired on request");
                let snapshot = self.resolve_round(&mut s).await?;
                self.advance(&mut s).await;
                Ok(snapshot)
            }
            RoundPhase::Ended { .. } => {
                Err(DomainError::conflict(ConflictKind::GameEnded, "Game has ended").into())
            }
            RoundPhase::Resolving { round } | RoundPhase::Closed { round } => {
                Err(DomainError::conflict(
                    ConflictKind::RoundClosed,
                    format!("Round {round} is not open"),
                )
                .into())
            }
        }
    }

    /// Re-run a round left in `Resolving`.
    pub async fn retry_resolution(self: &Arc<Self>) -> Result<RoundSnapshot, AppError> {
        let mut s = self.session.lock().await;
        match s.phase {
            RoundPhase::Resolving { round } => {
                if let Some(cause) = &s.aborted {
                    warn!(game_id = %self.game_id, round, error = %cause, "Retry refused; resolution hit a broken invariant");
                    return Err(cause.clone().into());
                }
                warn!(game_id = %self.game_id, round, "Retrying round resolution");
                let snapshot = self.resolve_round(&mut s).await?;
                self.advance(&mut s).await;
                Ok(snapshot)
            }
            RoundPhase::Ended { .. } => {
                Err(DomainError::conflict(ConflictKind::GameEnded, "Game has ended").into())
            }
            other => Err(DomainError::conflict(
                ConflictKind::Other("NOT_RESOLVING".into()),
                format!("Nothing to retry in phase {other:?}"),
            )
            .into()),
        }
    }

    /// Move to `Ended`. Idempotent.
    pub async fn terminate(&self) -> RoundPhase {
        let mut s = self.session.lock().await;
        if !s.phase.is_ended() {
            self.end_game(&mut s, EndReason::Terminated);
        }
        s.phase
    }

    pub async fn phase(&self) -> RoundPhase {
        self.session.lock().await.phase
    }

    pub async fn latest_snapshot(&self) -> Option<RoundSnapshot> {
        self.session.lock().await.latest().cloned()
    }

    pub async fn snapshot(&self, round: Round) -> Option<RoundSnapshot> {
        self.session.lock().await.history.get(round as usize).cloned()
    }

    pub async fn summary(&self) -> GameSummary {
        let s = self.session.lock().await;
        GameSummary::from_history(self.game_id, &s.history)
    }
}

/// Finalize the orders of `round` and derive its snapshot. Pure over the session.
fn compute_round(
    game_id: GameId,
    s: &GameSession,
    round: Round,
) -> Result<(RoleOrders, RoundSnapshot), DomainError> {
    let prior = s.opening_snapshot()?;
    let inputs = RoundInputs {
        customer_demand: s.strategies.demand.demand_for(round),
        supply_limit: s.strategies.supply.as_ref().map(|sup| sup.demand_for(round)),
    };
    let customer_demand = inputs.customer_demand;
    let policy = s.strategies.policy.as_ref();
    let budget = s.settings.budget.as_ref();
    let game_seed = s.game_seed;

    let orders = s.book.orders_for(
        round,
        &s.topology,
        &s.assignments,
        customer_demand,
        |req| {
            let Some(role) = prior.role(req.position) else {
                return req.incoming_demand;
            };
            let chosen = choose_or_mirror(
                policy,
                &PolicyContext {
                    game_seed,
                    round,
                    position: req.position,
                    incoming_demand: role.demand_seen(req.incoming_demand),
                    role,
                },
            );
            let quantity = match budget {
                Some(budget) => chosen.min(budget.affordable(req.position, role.money)),
                None => chosen,
            };
            if req.source == OrderSource::Fallback {
                info!(
                    game_id = %game_id,
                    round,
                    position = req.position,
                    quantity,
                    "Missing order filled by computer policy"
                );
            }
            quantity
        },
    )?;

    let next = FlowResolver::new(&s.topology, s.settings.cost_rates())
        .with_budget(budget)
        .resolve_with(&prior, &orders, inputs)?;
    Ok((orders, next))
}
