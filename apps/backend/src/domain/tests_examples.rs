//! Worked examples of round resolution through the order book and resolver.

use crate::domain::assignment::{Assignments, PlayerAssignment};
use crate::domain::flow::{CostRates, FlowResolver};
use crate::domain::order_book::{OrderBook, RoleOrders};
use crate::domain::roles::{GameId, PlayerId, RoleTemplate};
use crate::domain::snapshot::RoundSnapshot;
use crate::domain::topology::RoleTopology;

fn three_roles(retailer_inventory: i64) -> RoleTopology {
    RoleTopology::new(
        vec![
            RoleTemplate::new("Retailer", retailer_inventory),
            RoleTemplate::new("Wholesaler", 12),
            RoleTemplate::new("Manufacturer", 12),
        ],
        1,
    )
    .unwrap()
}

fn p(n: u128) -> PlayerId {
    PlayerId::from_u128(n)
}

/// Every role held by a player; each submits the given quantity.
fn play_round(
    topology: &RoleTopology,
    prior: &RoundSnapshot,
    quantities: &[i64],
    demand: u64,
) -> RoundSnapshot {
    let assignments = Assignments::new(
        (0..topology.len()).map(|i| PlayerAssignment::new(p(i as u128 + 1), i as u8)),
        topology,
    )
    .unwrap();
    let round = prior.round + 1;
    let mut book = OrderBook::open(round);
    for (i, q) in quantities.iter().enumerate() {
        book.submit(p(i as u128 + 1), round, *q).unwrap();
    }
    assert!(book.is_complete(assignments.players()));
    book.close();
    let orders: RoleOrders = book
        .orders_for(round, topology, &assignments, demand, |_| {
            panic!("no role should need filling")
        })
        .unwrap();
    FlowResolver::new(topology, CostRates::default())
        .resolve(prior, &orders, demand)
        .unwrap()
}

#[test]
fn steady_demand_draws_every_inventory_down() {
    let topology = three_roles(12);
    let r0 = topology.initial_snapshot(GameId::from_u128(9));

    let r1 = play_round(&topology, &r0, &[4, 4, 4], 4);

    assert_eq!(r1.round, 1);
    for role in &r1.roles {
        assert_eq!(role.inventory, 8, "{}", role.name);
        assert_eq!(role.backlog, 0, "{}", role.name);
        assert_eq!(role.shipment_sent, 4);
    }
    assert_eq!(r1.aggregate_demand, 4);
    assert_eq!(r1.aggregate_supply, 4);
}

#[test]
fn unmet_demand_accumulates_as_backlog() {
    let topology = three_roles(2);
    let r0 = topology.initial_snapshot(GameId::from_u128(9));

    // Retailer orders nothing, so nothing arrives in round 2.
    let r1 = play_round(&topology, &r0, &[0, 4, 4], 5);
    let retailer = &r1.roles[0];
    assert_eq!(retailer.shipment_sent, 2);
    assert_eq!(retailer.backlog, 3);
    assert_eq!(retailer.inventory, 0);

    let r2 = play_round(&topology, &r1, &[0, 4, 4], 5);
    let retailer = &r2.roles[0];
    assert_eq!(retailer.shipment_received, 0);
    assert_eq!(retailer.shipment_sent, 0);
    assert_eq!(retailer.backlog, 8);
}

#[test]
fn backlog_is_served_once_goods_arrive() {
    let topology = three_roles(0);
    let r0 = topology.initial_snapshot(GameId::nil());

    let r1 = play_round(&topology, &r0, &[10, 0, 0], 4);
    assert_eq!(r1.roles[0].backlog, 4);
    // Wholesaler shipped 10 to the retailer.
    assert_eq!(r1.roles[0].in_transit, vec![10]);

    let r2 = play_round(&topology, &r1, &[0, 0, 0], 4);
    assert_eq!(r2.roles[0].shipment_sent, 8);
    assert_eq!(r2.roles[0].backlog, 0);
    assert_eq!(r2.roles[0].inventory, 2);
}
