use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::roles::{PlayerId, Position};
use crate::domain::topology::RoleTopology;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAssignment {
    pub player: PlayerId,
    pub position: Position,
}

impl PlayerAssignment {
    pub fn new(player: PlayerId, position: Position) -> Self {
        Self { player, position }
    }
}

/// Player ↔ role mapping, fixed for the lifetime of a game.
///
/// Roles without a player are computer-controlled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignments {
    by_player: BTreeMap<PlayerId, Position>,
    by_position: BTreeMap<Position, PlayerId>,
}

impl Assignments {
    pub fn new(
        assignments: impl IntoIterator<Item = PlayerAssignment>,
        topology: &RoleTopology,
    ) -> Result<Self, DomainError> {
        let mut out = Self::default();
        for PlayerAssignment { player, position } in assignments {
            if topology.role(position).is_none() {
                return Err(DomainError::configuration(format!(
                    "player {player} assigned to position {position}, chain has {} roles",
                    topology.len()
                )));
            }
            if out.by_player.contains_key(&player) {
                return Err(DomainError::configuration(format!(
                    "player {player} assigned to more than one role"
                )));
            }
            if let Some(existing) = out.by_position.get(&position) {
                return Err(DomainError::configuration(format!(
                    "position {position} already assigned to player {existing}"
                )));
            }
            out.by_player.insert(player, position);
            out.by_position.insert(position, player);
        }
        Ok(out)
    }

    pub fn position_of(&self, player: PlayerId) -> Option<Position> {
        self.by_player.get(&player).copied()
    }

    pub fn player_at(&self, position: Position) -> Option<PlayerId> {
        self.by_position.get(&position).copied()
    }

    pub fn is_computer(&self, position: Position) -> bool {
        !self.by_position.contains_key(&position)
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.by_player.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }

    pub fn to_vec(&self) -> Vec<PlayerAssignment> {
        self.by_position
            .iter()
            .map(|(position, player)| PlayerAssignment::new(*player, *position))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u128) -> PlayerId {
        PlayerId::from_u128(n)
    }

    #[test]
    fn maps_players_both_ways() {
        let topology = RoleTopology::classic(12).unwrap();
        let a = Assignments::new(
            [PlayerAssignment::new(p(1), 0), PlayerAssignment::new(p(2), 2)],
            &topology,
        )
        .unwrap();

        assert_eq!(a.position_of(p(1)), Some(0));
        assert_eq!(a.player_at(2), Some(p(2)));
        assert!(a.is_computer(1));
        assert!(a.is_computer(3));
        assert!(!a.is_computer(0));
        assert_eq!(a.len(), 2);
        assert_eq!(a.position_of(p(9)), None);
    }

    #[test]
    fn rejects_double_booking() {
        let topology = RoleTopology::classic(12).unwrap();

        let same_player = [PlayerAssignment::new(p(1), 0), PlayerAssignment::new(p(1), 1)];
        assert!(matches!(
            Assignments::new(same_player, &topology),
            Err(DomainError::Configuration(_))
        ));

        let same_role = [PlayerAssignment::new(p(1), 0), PlayerAssignment::new(p(2), 0)];
        assert!(matches!(
            Assignments::new(same_role, &topology),
            Err(DomainError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_positions_outside_the_chain() {
        let topology = RoleTopology::classic(12).unwrap();
        let result = Assignments::new([PlayerAssignment::new(p(1), 4)], &topology);
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }
}
