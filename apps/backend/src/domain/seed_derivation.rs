//! RNG seed derivation utilities for deterministic game behavior.
//!
//! Every random choice in a game (computer orders, random demand) is seeded
//! from a single game seed so that a replay with the same inputs produces the
//! same snapshots.

use crate::domain::roles::{GameId, Position, Round};

/// Base seed for a game when the settings do not pin one.
///
/// Folds the 128-bit game id into 64 bits.
pub fn derive_game_seed(game_id: GameId) -> u64 {
    let raw = game_id.as_u128();
    (raw as u64) ^ ((raw >> 64) as u64)
}

/// Seed for a computer policy deciding the order of `position` in `round`.
///
/// Same game + round + position always yields the same seed.
pub fn derive_policy_seed(game_seed: u64, round: Round, position: Position) -> u64 {
    game_seed
        .wrapping_add((round as u64).wrapping_mul(10_000))
        .wrapping_add((position as u64).wrapping_mul(100))
        .wrapping_add(1) // Offset to distinguish from demand seed
}

/// Seed for the random demand of `round`.
pub fn derive_demand_seed(base_seed: u64, round: Round) -> u64 {
    base_seed
        .wrapping_add((round as u64).wrapping_mul(1_000_000))
        .wrapping_add(2)
}
