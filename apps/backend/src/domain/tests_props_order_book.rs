//! Property tests for the order book.

use proptest::prelude::*;

use crate::domain::order_book::OrderBook;
use crate::domain::roles::PlayerId;
use crate::domain::test_gens;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    /// Whatever the submission sequence, each player keeps their first valid order.
    #[test]
    fn prop_first_valid_order_wins(
        submissions in prop::collection::vec((0u128..4, -3i64..20), 1..30),
    ) {
        let mut book = OrderBook::open(1);
        let mut first = std::collections::BTreeMap::new();

        for (player, quantity) in submissions {
            let player = PlayerId::from_u128(player);
            match book.submit(player, 1, quantity) {
                Ok(order) => {
                    prop_assert!(!first.contains_key(&player));
                    prop_assert!(quantity >= 0);
                    first.insert(player, order.quantity);
                }
                Err(DomainError::Validation(ValidationKind::InvalidQuantity, _)) => {
                    prop_assert!(quantity < 0);
                }
                Err(DomainError::Conflict(ConflictKind::DuplicateOrder, _)) => {
                    prop_assert!(first.contains_key(&player));
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }

        for (player, quantity) in &first {
            prop_assert_eq!(book.order_of(*player).map(|o| o.quantity), Some(*quantity));
        }
        prop_assert_eq!(book.len(), first.len());
    }

    /// Submissions for any round other than the open one are rejected as closed.
    #[test]
    fn prop_other_rounds_are_closed(open in 1u32..50, other in 0u32..60) {
        prop_assume!(open != other);
        let mut book = OrderBook::open(open);
        let is_round_closed = matches!(
            book.submit(PlayerId::from_u128(1), other, 1),
            Err(DomainError::Conflict(ConflictKind::RoundClosed, _))
        );
        prop_assert!(is_round_closed);
        prop_assert!(book.is_empty());
    }
}
