//! Players, seats and the fixed team pairing.

use serde::{Deserialize, Serialize};

/// Seat index of a player (0-3)
pub type PlayerId = u8;

/// Number of seats at the table
pub const NUM_PLAYERS: usize = 4;

/// Partnership name. Seats 0 and 2 play Black, seats 1 and 3 play Red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamName {
    Black,
    Red,
}

impl TeamName {
    /// Team of the given seat
    pub fn for_player(id: PlayerId) -> Self {
        if id % 2 == 0 {
            TeamName::Black
        } else {
            TeamName::Red
        }
    }
}

/// A partnership of two seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: TeamName,
    pub players: [PlayerId; 2],
}

impl Team {
    /// Build the team for a name from the fixed pairing
    pub fn pairing(name: TeamName) -> Self {
        let players = match name {
            TeamName::Black => [0, 2],
            TeamName::Red => [1, 3],
        };
        Self { name, players }
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains(&id)
    }
}

/// A seated player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Seat index, fixed for the lifetime of the game
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Team, set once all four seats are filled
    pub team: Option<TeamName>,
    /// Whether the seat currently has someone behind it
    pub connected: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            team: None,
            connected: true,
        }
    }
}

/// Seat `steps` places clockwise from `id`
pub fn seat_after(id: PlayerId, steps: u8) -> PlayerId {
    (id + steps) % NUM_PLAYERS as PlayerId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_pairing() {
        assert_eq!(TeamName::for_player(0), TeamName::Black);
        assert_eq!(TeamName::for_player(1), TeamName::Red);
        assert_eq!(TeamName::for_player(2), TeamName::Black);
        assert_eq!(TeamName::for_player(3), TeamName::Red);

        let black = Team::pairing(TeamName::Black);
        assert!(black.contains(0) && black.contains(2));
        assert!(!black.contains(1));
    }

    #[test]
    fn test_seat_after_wraps() {
        assert_eq!(seat_after(3, 1), 0);
        assert_eq!(seat_after(1, 3), 0);
        assert_eq!(seat_after(2, 2), 0);
        assert_eq!(seat_after(0, 0), 0);
    }

    #[test]
    fn test_new_player_is_connected_without_team() {
        let player = Player::new(2, "Asha".to_string());
        assert!(player.connected);
        assert_eq!(player.team, None);
    }
}
