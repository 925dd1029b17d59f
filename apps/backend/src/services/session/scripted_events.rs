use tracing::{debug, info, warn};

use super::{GameSession, SessionHandle};
use crate::domain::events::{evaluate, EventAction, ResourceAdjustment};
use crate::domain::roles::Round;
use crate::ws::protocol::GameEvent;

impl SessionHandle {
    /// Run the scripted events for `round`, which is opening.
    ///
    /// Messages and settings changes are published right away; resource
    /// adjustments are queued for the round's resolution.
    pub(super) fn run_scripted_events(&self, s: &mut GameSession, round: Round) {
        s.adjustments.clear();
        if s.settings.events.is_empty() {
            return;
        }
        let events = s.settings.events.clone();
        let Some(latest) = s.latest().cloned() else {
            return;
        };
        let previous = s.history.iter().rev().nth(1).cloned();

        for firing in evaluate(&events, round, &latest, previous.as_ref()) {
            let name = &firing.event.name;
            debug!(game_id = %self.game_id, round, event = %name, targets = ?firing.targets, "Scripted event fired");
            for action in &firing.event.actions {
                match action {
                    EventAction::ShowMessage { message, target } => {
                        self.deps.events.publish(GameEvent::EventMessage {
                            game_id: self.game_id,
                            round,
                            event: name.clone(),
                            message: message.clone(),
                            positions: firing.positions(*target, &latest),
                        });
                    }
                    EventAction::ChangeSettings { change } => {
                        if let Err(e) = s.apply_settings_change(change) {
                            warn!(game_id = %self.game_id, round, event = %name, error = %e, "Settings change rejected");
                            continue;
                        }
                        info!(game_id = %self.game_id, round, event = %name, "Settings changed by event");
                        self.deps.events.publish(GameEvent::SettingsChanged {
                            game_id: self.game_id,
                            round,
                            event: name.clone(),
                            change: change.clone(),
                        });
                    }
                    EventAction::AddResource {
                        resource,
                        target,
                        value,
                    } => {
                        let adjustments: Vec<ResourceAdjustment> = firing
                            .positions(*target, &latest)
                            .into_iter()
                            .map(|position| ResourceAdjustment {
                                position,
                                resource: *resource,
                                value: *value,
                            })
                            .collect();
                        s.adjustments.extend(adjustments.iter().copied());
                        self.deps.events.publish(GameEvent::ResourceAdjusted {
                            game_id: self.game_id,
                            round,
                            event: name.clone(),
                            adjustments,
                        });
                    }
                }
            }
        }
    }
}

impl GameSession {
    /// Re-apply the settings changes of rounds `1..=last_round` after a restore.
    ///
    /// Messages and adjustments of those rounds already happened; only the
    /// settings they left behind need rebuilding.
    pub(super) fn replay_settings_changes(&mut self, last_round: Round) {
        let events = self.settings.events.clone();
        for round in 1..=last_round {
            let Some(latest) = self.history.get(round as usize - 1) else {
                break;
            };
            let previous = (round >= 2)
                .then(|| self.history.get(round as usize - 2))
                .flatten();
            let changes: Vec<_> = evaluate(&events, round, latest, previous)
                .into_iter()
                .flat_map(|f| f.event.actions.iter())
                .filter_map(|action| match action {
                    EventAction::ChangeSettings { change } => Some(change.clone()),
                    _ => None,
                })
                .collect();
            for change in changes {
                if let Err(e) = self.apply_settings_change(&change) {
                    warn!(round, error = %e, "Replayed settings change rejected");
                }
            }
        }
    }
}
