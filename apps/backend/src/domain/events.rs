//! Scripted game events.
//!
//! Each event pairs a condition over the chain state with a list of actions.
//! Conditions are checked whenever a round opens, against the latest resolved
//! snapshot (and the one before it for change conditions). Evaluation is pure;
//! the session publishes messages, applies settings changes and queues
//! resource adjustments for the round's resolution.

use serde::{Deserialize, Serialize};

use crate::domain::demand::DemandStyle;
use crate::domain::roles::{Position, Round};
use crate::domain::snapshot::{RoleState, RoundSnapshot};
use crate::errors::domain::{DomainError, InvariantKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub name: String,
    pub condition: EventCondition,
    pub actions: Vec<EventAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventCondition {
    /// Fires when `round` opens. Targets every role.
    RoundReached { round: Round },
    ValueExceeds {
        resource: Resource,
        met_by: MetBy,
        value: i64,
    },
    /// A role's resource moved by more than `value` between the last two
    /// snapshots. Targets the roles that moved.
    SingleChange { resource: Resource, value: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetBy {
    /// Any role above `value`; targets those roles.
    SingleRole,
    /// Mean over all roles above `value`; targets every role.
    Average,
    /// No role below `value`; targets every role.
    AllRoles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Money,
    Inventory,
    Backlog,
    /// Cumulative cost.
    Cost,
}

impl Resource {
    pub fn read(self, role: &RoleState) -> i64 {
        let raw = match self {
            Resource::Money => role.money,
            Resource::Inventory => role.inventory,
            Resource::Backlog => role.backlog,
            Resource::Cost => role.cumulative_cost,
        };
        i64::try_from(raw).unwrap_or(i64::MAX)
    }

    fn slot(self, role: &mut RoleState) -> &mut u64 {
        match self {
            Resource::Money => &mut role.money,
            Resource::Inventory => &mut role.inventory,
            Resource::Backlog => &mut role.backlog,
            Resource::Cost => &mut role.cumulative_cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTarget {
    /// The roles selected by the condition.
    EventTarget,
    AllRoles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EventAction {
    ShowMessage {
        message: String,
        target: ActionTarget,
    },
    ChangeSettings {
        change: SettingsChange,
    },
    AddResource {
        resource: Resource,
        target: ActionTarget,
        value: i64,
    },
}

/// Settings replaced by a `ChangeSettings` action. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holding_cost: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backlog_cost: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demand: Option<DemandStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<DemandStyle>,
}

/// A change to one role's state, applied before the round's goods move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAdjustment {
    pub position: Position,
    pub resource: Resource,
    pub value: i64,
}

/// An event whose condition held, with the roles it selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing<'a> {
    pub event: &'a ScriptedEvent,
    pub targets: Vec<Position>,
}

impl Firing<'_> {
    pub fn positions(&self, target: ActionTarget, latest: &RoundSnapshot) -> Vec<Position> {
        match target {
            ActionTarget::EventTarget => self.targets.clone(),
            ActionTarget::AllRoles => all_positions(latest),
        }
    }
}

impl ScriptedEvent {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.actions.is_empty() {
            return Err(DomainError::configuration(format!(
                "event {} has no actions",
                self.name
            )));
        }
        for action in &self.actions {
            if let EventAction::ChangeSettings { change } = action {
                if change.round_timeout_ms == Some(0) {
                    return Err(DomainError::configuration(format!(
                        "event {} sets a zero round timeout",
                        self.name
                    )));
                }
                for style in [&change.demand, &change.supply].into_iter().flatten() {
                    style.validate()?;
                }
            }
        }
        Ok(())
    }
}

/// Events whose condition holds as `round` opens, in declaration order.
pub fn evaluate<'a>(
    events: &'a [ScriptedEvent],
    round: Round,
    latest: &RoundSnapshot,
    previous: Option<&RoundSnapshot>,
) -> Vec<Firing<'a>> {
    events
        .iter()
        .filter_map(|event| {
            let targets = match event.condition {
                EventCondition::RoundReached { round: at } if at == round => all_positions(latest),
                EventCondition::RoundReached { .. } => Vec::new(),
                EventCondition::ValueExceeds {
                    resource,
                    met_by,
                    value,
                } => value_exceeds(latest, resource, met_by, value),
                EventCondition::SingleChange { resource, value } => match previous {
                    Some(previous) => single_change(latest, previous, resource, value),
                    None => Vec::new(),
                },
            };
            (!targets.is_empty()).then_some(Firing { event, targets })
        })
        .collect()
}

fn all_positions(snapshot: &RoundSnapshot) -> Vec<Position> {
    snapshot.roles.iter().map(|r| r.position).collect()
}

fn value_exceeds(snapshot: &RoundSnapshot, resource: Resource, met_by: MetBy, value: i64) -> Vec<Position> {
    let roles = &snapshot.roles;
    match met_by {
        MetBy::SingleRole => roles
            .iter()
            .filter(|r| resource.read(r) > value)
            .map(|r| r.position)
            .collect(),
        MetBy::Average => {
            if roles.is_empty() {
                return Vec::new();
            }
            let sum: i128 = roles.iter().map(|r| i128::from(resource.read(r))).sum();
            if sum / roles.len() as i128 > i128::from(value) {
                all_positions(snapshot)
            } else {
                Vec::new()
            }
        }
        MetBy::AllRoles => {
            if roles.iter().all(|r| resource.read(r) >= value) {
                all_positions(snapshot)
            } else {
                Vec::new()
            }
        }
    }
}

fn single_change(
    latest: &RoundSnapshot,
    previous: &RoundSnapshot,
    resource: Resource,
    value: i64,
) -> Vec<Position> {
    latest
        .roles
        .iter()
        .zip(&previous.roles)
        .filter(|(now, before)| {
            let delta = i128::from(resource.read(now)) - i128::from(resource.read(before));
            delta.abs() > i128::from(value)
        })
        .map(|(now, _)| now.position)
        .collect()
}

/// Apply queued adjustments to the state a round starts from.
///
/// Negative values stop at zero; positive ones must not overflow.
pub fn apply_adjustments(
    snapshot: &mut RoundSnapshot,
    adjustments: &[ResourceAdjustment],
) -> Result<(), DomainError> {
    for adj in adjustments {
        let role = snapshot
            .roles
            .get_mut(adj.position as usize)
            .ok_or_else(|| {
                DomainError::insufficient_topology(format!(
                    "adjustment for missing role {}",
                    adj.position
                ))
            })?;
        let slot = adj.resource.slot(role);
        *slot = if adj.value >= 0 {
            slot.checked_add(adj.value.unsigned_abs()).ok_or_else(|| {
                DomainError::invariant(
                    InvariantKind::Overflow,
                    format!("{:?} adjustment overflowed", adj.resource),
                )
            })?
        } else {
            slot.saturating_sub(adj.value.unsigned_abs())
        };
    }
    Ok(())
}
