use std::sync::Arc;

use tracing::{debug, info};

use super::{GameSession, RoundPhase, SessionHandle};
use crate::domain::assignment::Assignments;
use crate::domain::order_book::Order;
use crate::domain::roles::{PlayerId, Position, Round};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::ws::protocol::GameEvent;

impl SessionHandle {
    /// Record an order from `player`.
    ///
    /// `round` defaults to the open round. Submission and the completion check
    /// happen under the session lock; a completing order resolves the round
    /// before this returns.
    pub async fn submit_order(
        self: &Arc<Self>,
        player: PlayerId,
        round: Option<Round>,
        quantity: i64,
    ) -> Result<Order, AppError> {
        let mut s = self.session.lock().await;
        debug!(game_id = %self.game_id, %player, ?round, quantity, "Submitting order");

        let open_round = match s.phase {
            RoundPhase::Open { round } => round,
            RoundPhase::Ended { .. } => {
                return Err(DomainError::conflict(
                    ConflictKind::GameEnded,
                    format!("Game {} has ended", self.game_id),
                )
                .into())
            }
            RoundPhase::Resolving { round } | RoundPhase::Closed { round } => {
                return Err(DomainError::conflict(
                    ConflictKind::RoundClosed,
                    format!("Round {round} is closing"),
                )
                .into())
            }
        };
        let position = self.require_position(&s.assignments, player)?;
        let round = round.unwrap_or(open_round);
        if round == open_round && s.book.order_of(player).is_none() {
            if let Ok(units) = u64::try_from(quantity) {
                check_funds(&s, position, units)?;
            }
        }

        let order = s.book.submit(player, round, quantity)?;
        info!(
            game_id = %self.game_id,
            %player,
            position,
            round = order.round,
            quantity = order.quantity,
            "Order accepted"
        );
        self.deps.events.publish(GameEvent::OrderAccepted {
            game_id: self.game_id,
            player,
            round: order.round,
            quantity: order.quantity,
        });

        self.advance(&mut s).await;
        Ok(order)
    }

    /// Track a player's connection. Disconnected players are not waited for.
    pub async fn set_presence(
        self: &Arc<Self>,
        player: PlayerId,
        connected: bool,
    ) -> Result<(), AppError> {
        let mut s = self.session.lock().await;
        let position = self.require_position(&s.assignments, player)?;

        let changed = if connected {
            s.disconnected.remove(&player)
        } else {
            s.disconnected.insert(player)
        };
        if !changed {
            return Ok(());
        }

        info!(game_id = %self.game_id, %player, position, connected, "Player presence changed");
        self.deps.events.publish(GameEvent::PlayerPresence {
            game_id: self.game_id,
            player,
            connected,
        });

        // Losing the last missing player completes the round once; further
        // rounds wait for someone to connect or for the deadline.
        if !connected && matches!(s.phase, RoundPhase::Open { .. }) && s.book_complete() {
            if self.resolve_round(&mut s).await.is_ok() {
                self.advance(&mut s).await;
            }
        }
        Ok(())
    }

    fn require_position(
        &self,
        assignments: &Assignments,
        player: PlayerId,
    ) -> Result<Position, AppError> {
        assignments.position_of(player).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::NotAPlayer,
                format!("Player {player} holds no role in game {}", self.game_id),
            )
            .into()
        })
    }
}

/// Refuse an order the role cannot pay for with its money at round open.
fn check_funds(s: &GameSession, position: Position, quantity: u64) -> Result<(), AppError> {
    let Some(budget) = &s.settings.budget else {
        return Ok(());
    };
    let money = s.available_money(position)?;
    match budget.order_cost(position, quantity) {
        Some(cost) if cost <= money => Ok(()),
        cost => Err(DomainError::validation(
            ValidationKind::InsufficientFunds,
            format!(
                "Order of {quantity} costs {} but position {position} has {money}",
                cost.map_or_else(|| "more than can be counted".to_string(), |c| c.to_string())
            ),
        )
        .into()),
    }
}
