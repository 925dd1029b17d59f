//! Event sink that keeps every published event for assertions.

use parking_lot::Mutex;
use supply_chain_backend::domain::{Round, RoundSnapshot};
use supply_chain_backend::{ErrorCode, EventSink, GameEvent};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(GameEvent::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events.lock().iter().filter(|e| e.kind() == kind).count()
    }

    /// Rounds in the order their `RoundResolved` events were published.
    pub fn resolved_rounds(&self) -> Vec<Round> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                GameEvent::RoundResolved { round, .. } => Some(*round),
                _ => None,
            })
            .collect()
    }

    pub fn resolved_snapshot(&self, round: Round) -> Option<RoundSnapshot> {
        self.events.lock().iter().find_map(|e| match e {
            GameEvent::RoundResolved {
                round: r, snapshot, ..
            } if *r == round => Some(snapshot.clone()),
            _ => None,
        })
    }

    pub fn rejection_codes(&self) -> Vec<ErrorCode> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                GameEvent::OrderRejected { code, .. } => Some(*code),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: GameEvent) {
        self.events.lock().push(event);
    }
}
