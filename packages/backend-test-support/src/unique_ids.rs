//! Identifier helpers for tests.
//!
//! `unique_*` ids are fresh per call so parallel tests sharing a coordinator
//! never collide. `fixed_*` ids are stable and readable in assertions.

use uuid::Uuid;

/// A fresh random game id.
///
/// ```
/// use backend_test_support::unique_ids::unique_game_id;
///
/// assert_ne!(unique_game_id(), unique_game_id());
/// ```
pub fn unique_game_id() -> Uuid {
    Uuid::new_v4()
}

/// `count` fresh player ids.
pub fn unique_players(count: usize) -> Vec<Uuid> {
    (0..count).map(|_| Uuid::new_v4()).collect()
}

/// A stable player id, e.g. `fixed_player(1)` is always the same player.
///
/// ```
/// use backend_test_support::unique_ids::fixed_player;
///
/// assert_eq!(fixed_player(3), fixed_player(3));
/// assert_ne!(fixed_player(3), fixed_player(4));
/// ```
pub fn fixed_player(n: u32) -> Uuid {
    Uuid::from_u128(0x1000_0000 + u128::from(n))
}
