use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;
use uuid::Uuid;

use crate::domain::roles::{GameId, PlayerId};
use crate::ws::protocol::GameEvent;

/// Outbound side of a session. Must not block.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: GameEvent);
}

struct Subscriber {
    /// `None` receives every event except other players' rejections.
    player: Option<PlayerId>,
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl Subscriber {
    fn wants(&self, event: &GameEvent) -> bool {
        match event {
            GameEvent::OrderRejected { player, .. } => self.player == Some(*player),
            _ => true,
        }
    }
}

/// Registration handle returned by [`GameEventHub::subscribe`].
pub struct Subscription {
    pub token: Uuid,
    pub events: UnboundedReceiverStream<GameEvent>,
}

/// Fan-out of game events to connected transports, keyed by game.
#[derive(Default)]
pub struct GameEventHub {
    sessions: DashMap<GameId, DashMap<Uuid, Subscriber>>,
}

impl GameEventHub {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn subscribe(&self, game_id: GameId, player: Option<PlayerId>) -> Subscription {
        let token = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let entry = self.sessions.entry(game_id).or_default();
        entry.insert(token, Subscriber { player, tx });
        Subscription {
            token,
            events: UnboundedReceiverStream::new(rx),
        }
    }

    pub fn unregister(&self, game_id: GameId, token: Uuid) {
        if let Some(entry) = self.sessions.get(&game_id) {
            entry.remove(&token);
        }
        self.sessions.remove_if(&game_id, |_, subs| subs.is_empty());
    }

    pub fn subscriber_count(&self, game_id: GameId) -> usize {
        self.sessions.get(&game_id).map(|s| s.len()).unwrap_or(0)
    }
}

impl EventSink for GameEventHub {
    fn publish(&self, event: GameEvent) {
        let game_id = event.game_id();
        let mut closed = Vec::new();
        if let Some(entry) = self.sessions.get(&game_id) {
            for sub in entry.iter() {
                if sub.wants(&event) && sub.tx.send(event.clone()).is_err() {
                    closed.push(*sub.key());
                }
            }
        }
        for token in closed {
            debug!(game_id = %game_id, %token, "Dropping closed subscriber");
            self.unregister(game_id, token);
        }
    }
}
