//! Property tests for the flow resolver (pure domain).
//!
//! - Same inputs give byte-identical snapshots
//! - Backlog and inventory never go negative (u64) and goods are conserved
//! - shipped = incoming demand + prior backlog - new backlog, per role per round

use proptest::prelude::*;

use crate::domain::flow::{CostRates, FlowResolver};
use crate::domain::roles::GameId;
use crate::domain::test_gens;

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    #[test]
    fn prop_resolution_is_deterministic(
        (topology, script) in test_gens::game_script(6),
    ) {
        let resolver = FlowResolver::new(&topology, CostRates::default());
        let mut a = topology.initial_snapshot(GameId::from_u128(1));
        let mut b = a.clone();
        for (orders, demand) in &script {
            a = resolver.resolve(&a, orders, *demand).unwrap();
            b = resolver.resolve(&b, orders, *demand).unwrap();
            prop_assert_eq!(a.encode().unwrap(), b.encode().unwrap());
            prop_assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        }
    }

    #[test]
    fn prop_shipped_balances_backlog(
        (topology, script) in test_gens::game_script(8),
    ) {
        let resolver = FlowResolver::new(&topology, CostRates::default());
        let mut prior = topology.initial_snapshot(GameId::nil());
        for (orders, demand) in &script {
            let next = resolver.resolve(&prior, orders, *demand).unwrap();
            for (before, after) in prior.roles.iter().zip(&next.roles) {
                prop_assert_eq!(
                    after.shipment_sent + after.backlog,
                    after.incoming_demand + before.backlog,
                    "role {} in round {}", after.position, next.round
                );
                prop_assert_eq!(
                    after.inventory + after.shipment_sent,
                    before.inventory + after.shipment_received
                );
                prop_assert_eq!(after.in_transit.len(), topology.transit_delay() as usize);
            }
            prop_assert_eq!(next.aggregate_demand, *demand);
            prop_assert_eq!(next.roles[0].incoming_demand, *demand);
            prop_assert_eq!(next.round, prior.round + 1);
            prior = next;
        }
    }

    #[test]
    fn prop_incoming_demand_is_downstream_order(
        (topology, script) in test_gens::game_script(3),
    ) {
        let resolver = FlowResolver::new(&topology, CostRates::default());
        let mut prior = topology.initial_snapshot(GameId::nil());
        for (orders, demand) in &script {
            let next = resolver.resolve(&prior, orders, *demand).unwrap();
            for window in next.roles.windows(2) {
                prop_assert_eq!(window[1].incoming_demand, window[0].order_placed);
            }
            let producer = next.roles.last().unwrap();
            prop_assert_eq!(next.aggregate_supply, producer.shipment_sent);
            prior = next;
        }
    }
}
