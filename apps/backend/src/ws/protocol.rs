use serde::{Deserialize, Serialize};

use crate::domain::events::{ResourceAdjustment, SettingsChange};
use crate::domain::order_book::RoleOrder;
use crate::domain::roles::{GameId, PlayerId, Position, Round};
use crate::domain::snapshot::RoundSnapshot;
use crate::domain::stats::GameSummary;
use crate::errors::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    MaxRoundsReached,
    Terminated,
}

/// Events published by a game session, in the order they happened.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RoundOpened {
        game_id: GameId,
        round: Round,
        #[serde(skip_serializing_if = "Option::is_none")]
        deadline_ms: Option<u64>,
        expected_players: Vec<PlayerId>,
    },

    OrderAccepted {
        game_id: GameId,
        player: PlayerId,
        round: Round,
        quantity: u64,
    },

    /// Sent to the submitting player only.
    OrderRejected {
        game_id: GameId,
        player: PlayerId,
        #[serde(skip_serializing_if = "Option::is_none")]
        round: Option<Round>,
        code: ErrorCode,
        reason: String,
    },

    RoundResolved {
        game_id: GameId,
        round: Round,
        digest: String,
        orders: Vec<RoleOrder>,
        snapshot: RoundSnapshot,
    },

    PlayerPresence {
        game_id: GameId,
        player: PlayerId,
        connected: bool,
    },

    /// Message of a scripted event for the roles at `positions`.
    EventMessage {
        game_id: GameId,
        round: Round,
        event: String,
        message: String,
        positions: Vec<Position>,
    },

    /// Queued for the resolution of `round`.
    ResourceAdjusted {
        game_id: GameId,
        round: Round,
        event: String,
        adjustments: Vec<ResourceAdjustment>,
    },

    /// Applies from `round` on.
    SettingsChanged {
        game_id: GameId,
        round: Round,
        event: String,
        change: SettingsChange,
    },

    GameEnded {
        game_id: GameId,
        reason: EndReason,
        summary: GameSummary,
    },
}

impl GameEvent {
    pub fn game_id(&self) -> GameId {
        match self {
            GameEvent::RoundOpened { game_id, .. }
            | GameEvent::OrderAccepted { game_id, .. }
            | GameEvent::OrderRejected { game_id, .. }
            | GameEvent::RoundResolved { game_id, .. }
            | GameEvent::PlayerPresence { game_id, .. }
            | GameEvent::EventMessage { game_id, .. }
            | GameEvent::ResourceAdjusted { game_id, .. }
            | GameEvent::SettingsChanged { game_id, .. }
            | GameEvent::GameEnded { game_id, .. } => *game_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::RoundOpened { .. } => "round_opened",
            GameEvent::OrderAccepted { .. } => "order_accepted",
            GameEvent::OrderRejected { .. } => "order_rejected",
            GameEvent::RoundResolved { .. } => "round_resolved",
            GameEvent::PlayerPresence { .. } => "player_presence",
            GameEvent::EventMessage { .. } => "event_message",
            GameEvent::ResourceAdjusted { .. } => "resource_adjusted",
            GameEvent::SettingsChanged { .. } => "settings_changed",
            GameEvent::GameEnded { .. } => "game_ended",
        }
    }
}
