//! Round scoring: tens and tricks per team, round winner and Kot.

use crate::player::TeamName;
use crate::trick::Trick;
use serde::{Deserialize, Serialize};

/// Number of tens in the deck; collecting all of them is a Kot
pub const TOTAL_TENS: u32 = 4;

/// Tally for one team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub tens: u32,
    pub tricks: u32,
}

/// Tallies for both teams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScores {
    pub black: TeamScore,
    pub red: TeamScore,
}

impl TeamScores {
    pub fn get(&self, team: TeamName) -> &TeamScore {
        match team {
            TeamName::Black => &self.black,
            TeamName::Red => &self.red,
        }
    }

    fn get_mut(&mut self, team: TeamName) -> &mut TeamScore {
        match team {
            TeamName::Black => &mut self.black,
            TeamName::Red => &mut self.red,
        }
    }

    /// Recompute the tallies from resolved tricks.
    ///
    /// Tricks without a winner are skipped.
    pub fn from_tricks(tricks: &[Trick]) -> Self {
        tricks.iter().fold(Self::default(), |mut scores, trick| {
            if let Some(winner) = trick.winner_id {
                let score = scores.get_mut(TeamName::for_player(winner));
                score.tricks += 1;
                score.tens += trick.tens();
            }
            scores
        })
    }

    /// Team with more tens; on equal tens the team with more tricks.
    pub fn winner(&self) -> TeamName {
        if self.black.tens != self.red.tens {
            if self.black.tens > self.red.tens {
                TeamName::Black
            } else {
                TeamName::Red
            }
        } else if self.black.tricks >= self.red.tricks {
            TeamName::Black
        } else {
            TeamName::Red
        }
    }

    /// Whether one team collected every ten
    pub fn is_kot(&self) -> bool {
        self.black.tens == TOTAL_TENS || self.red.tens == TOTAL_TENS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};
    use pretty_assertions::assert_eq;

    fn scores(black: (u32, u32), red: (u32, u32)) -> TeamScores {
        TeamScores {
            black: TeamScore {
                tens: black.0,
                tricks: black.1,
            },
            red: TeamScore {
                tens: red.0,
                tricks: red.1,
            },
        }
    }

    fn resolved(id: u8, winner: u8, cards: [Card; 4]) -> Trick {
        let mut trick = Trick::new(id, 0);
        for (seat, card) in cards.into_iter().enumerate() {
            trick.add_play(seat as u8, card);
        }
        trick.winner_id = Some(winner);
        trick
    }

    #[test]
    fn test_tie_on_tens_goes_to_more_tricks() {
        assert_eq!(scores((2, 7), (2, 6)).winner(), TeamName::Black);
        assert_eq!(scores((2, 5), (2, 8)).winner(), TeamName::Red);
    }

    #[test]
    fn test_more_tens_wins_regardless_of_tricks() {
        assert_eq!(scores((1, 10), (3, 3)).winner(), TeamName::Red);
        assert_eq!(scores((3, 2), (1, 11)).winner(), TeamName::Black);
    }

    #[test]
    fn test_kot() {
        assert!(scores((4, 6), (0, 7)).is_kot());
        assert!(scores((0, 1), (4, 12)).is_kot());
        assert!(!scores((3, 9), (1, 4)).is_kot());
    }

    #[test]
    fn test_from_tricks() {
        let tricks = vec![
            resolved(
                1,
                1,
                [
                    Card::new(Suit::Hearts, Rank::Ten),
                    Card::new(Suit::Hearts, Rank::Ace),
                    Card::new(Suit::Clubs, Rank::Ten),
                    Card::new(Suit::Hearts, Rank::Two),
                ],
            ),
            resolved(
                2,
                2,
                [
                    Card::new(Suit::Spades, Rank::Three),
                    Card::new(Suit::Spades, Rank::Four),
                    Card::new(Suit::Spades, Rank::Ten),
                    Card::new(Suit::Spades, Rank::Five),
                ],
            ),
        ];

        assert_eq!(TeamScores::from_tricks(&tricks), scores((1, 1), (2, 1)));
    }

    #[test]
    fn test_unresolved_tricks_ignored() {
        let mut trick = Trick::new(1, 0);
        trick.add_play(0, Card::new(Suit::Hearts, Rank::Ten));
        assert_eq!(TeamScores::from_tricks(&[trick]), TeamScores::default());
    }
}
