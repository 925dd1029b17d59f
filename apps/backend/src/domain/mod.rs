//! Domain layer: pure supply-chain types and round resolution.

pub mod assignment;
pub mod budget;
pub mod demand;
pub mod events;
pub mod flow;
pub mod order_book;
pub mod roles;
pub mod seed_derivation;
pub mod snapshot;
pub mod stats;
pub mod topology;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_examples;
#[cfg(test)]
mod tests_props_flow;
#[cfg(test)]
mod tests_props_order_book;

pub use assignment::{Assignments, PlayerAssignment};
pub use budget::{Budget, RoleBudget};
pub use demand::{DemandSchedule, DemandStyle};
pub use events::{
    ActionTarget, EventAction, EventCondition, MetBy, Resource, ResourceAdjustment, ScriptedEvent,
    SettingsChange,
};pub use flow::{CostRates, FlowResolver, RoundInputs};
pub use order_book::{FillRequest, Order, OrderBook, OrderSource, RoleOrder, RoleOrders};
pub use roles::{GameId, PlayerId, Position, Role, RoleTemplate, Round};
pub use snapshot::{RoleState, RoundSnapshot};
pub use stats::GameSummary;
pub use topology::RoleTopology;
