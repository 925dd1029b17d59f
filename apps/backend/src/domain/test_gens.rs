// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::order_book::{OrderSource, RoleOrder, RoleOrders};
use crate::domain::roles::{RoleTemplate, Round};
use crate::domain::topology::RoleTopology;

pub fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

/// A role template with in-transit shipments no longer than `delay`.
pub fn role_template(delay: u32) -> impl Strategy<Value = RoleTemplate> {
    (
        0i64..40,
        0i64..10,
        prop::collection::vec(0i64..10, 0..=delay as usize),
    )
        .prop_map(|(inventory, backlog, in_transit)| {
            RoleTemplate::new("role", inventory)
                .with_backlog(backlog)
                .with_in_transit(in_transit)
        })
}

/// A valid chain of 2..=6 roles with a transit delay of 1..=3.
pub fn topology() -> impl Strategy<Value = RoleTopology> {
    (1u32..=3, 2usize..=6)
        .prop_flat_map(|(delay, len)| {
            (Just(delay), prop::collection::vec(role_template(delay), len))
        })
        .prop_map(|(delay, templates)| {
            let templates = templates
                .into_iter()
                .enumerate()
                .map(|(i, mut t)| {
                    t.name = format!("role-{i}");
                    t
                })
                .collect();
            match RoleTopology::new(templates, delay) {
                Ok(topology) => topology,
                Err(e) => panic!("generated invalid topology: {e}"),
            }
        })
}

/// Player orders for every role of a chain of `len` roles.
pub fn role_orders(round: Round, len: usize) -> impl Strategy<Value = RoleOrders> {
    prop::collection::vec(0u64..30, len).prop_map(move |quantities| RoleOrders {
        round,
        entries: quantities
            .into_iter()
            .enumerate()
            .map(|(i, quantity)| RoleOrder {
                position: i as u8,
                quantity,
                source: OrderSource::Player,
            })
            .collect(),
    })
}

/// A topology with `rounds` rounds of orders and customer demand.
pub fn game_script(
    rounds: usize,
) -> impl Strategy<Value = (RoleTopology, Vec<(RoleOrders, u64)>)> {
    topology().prop_flat_map(move |topology| {
        let len = topology.len();
        let script: Vec<_> = (1..=rounds)
            .map(|round| (role_orders(round as Round, len), 0u64..30))
            .collect();
        (Just(topology), script)
    })
}
