//! Computer players.
//!
//! - Easy: random legal moves
//! - Medium: calls its longest suit as master and plays the cheapest card
//!   that currently takes the trick, otherwise throws its lowest card

use crate::actions::GameAction;
use crate::card::{Card, Suit};
use crate::game::GameState;
use crate::player::{PlayerId, TeamName};
use crate::round::{RoundPhase, RoundState};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
}

/// A bot player that can decide on actions
pub struct Bot {
    pub player_id: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(player_id: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decide what to do, if anything is expected from this seat right now
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        let round = game.current_round.as_ref()?;

        match round.phase {
            RoundPhase::MasterSelection if round.master_caller_id == self.player_id => {
                Some(GameAction::ChooseMasterSuit(self.choose_suit(round)))
            }
            RoundPhase::Playing if round.current_turn() == Some(self.player_id) => {
                self.choose_card(round).map(GameAction::PlayCard)
            }
            _ => None,
        }
    }

    fn choose_suit(&mut self, round: &RoundState) -> Suit {
        match self.difficulty {
            BotDifficulty::Easy => *Suit::ALL.choose(&mut self.rng).unwrap_or(&Suit::Spades),
            BotDifficulty::Medium => longest_suit(round.hand(self.player_id)),
        }
    }

    fn choose_card(&mut self, round: &RoundState) -> Option<Card> {
        let playable = round.playable_cards(self.player_id);
        match self.difficulty {
            BotDifficulty::Easy => playable.choose(&mut self.rng).copied(),
            BotDifficulty::Medium => self.choose_medium(round, &playable),
        }
    }

    fn choose_medium(&self, round: &RoundState, playable: &[Card]) -> Option<Card> {
        let master = round.master_suit?;
        let trick = round.current_trick.as_ref()?;

        // Partner already holds the trick: keep high cards back
        let own_team = TeamName::for_player(self.player_id);
        let played = trick.cards_played.iter().map(|p| (p.player_id, p.card));
        let partner_winning = current_winner(played, master)
            .map(|(seat, _)| seat != self.player_id && TeamName::for_player(seat) == own_team)
            .unwrap_or(false);

        if !partner_winning {
            let winning = playable
                .iter()
                .filter(|card| {
                    let plays = trick
                        .cards_played
                        .iter()
                        .map(|p| (p.player_id, p.card))
                        .chain(std::iter::once((self.player_id, **card)));
                    current_winner(plays, master).map(|(seat, _)| seat) == Some(self.player_id)
                })
                .min_by_key(|card| strength(**card, master));
            if let Some(card) = winning {
                return Some(*card);
            }
        }

        playable.iter().min_by_key(|c| strength(**c, master)).copied()
    }
}

/// Suit the hand holds most of, ties going to the higher total value
fn longest_suit(hand: &[Card]) -> Suit {
    Suit::ALL
        .iter()
        .copied()
        .max_by_key(|suit| {
            let cards = hand.iter().filter(|c| c.suit == *suit);
            let count = cards.clone().count();
            let value: u32 = cards.map(|c| c.value() as u32).sum();
            (count, value)
        })
        .unwrap_or(Suit::Spades)
}

/// Seat and card currently holding a partial trick
fn current_winner<I>(plays: I, master: Suit) -> Option<(PlayerId, Card)>
where
    I: IntoIterator<Item = (PlayerId, Card)>,
{
    let mut plays = plays.into_iter();
    let mut best = plays.next()?;
    for (seat, card) in plays {
        let takes = match (card.suit == master, best.1.suit == master) {
            (true, false) => true,
            (false, true) => false,
            _ => card.suit == best.1.suit && card.value() > best.1.value(),
        };
        if takes {
            best = (seat, card);
        }
    }
    Some(best)
}

/// Ordering key for giving cards away cheaply: masters are worth more
fn strength(card: Card, master: Suit) -> u8 {
    if card.suit == master {
        card.value() + 20
    } else {
        card.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;

    #[test]
    fn test_longest_suit() {
        let hand = vec![
            Card::new(Suit::Hearts, Rank::Two),
            Card::new(Suit::Clubs, Rank::Ace),
            Card::new(Suit::Hearts, Rank::Five),
            Card::new(Suit::Diamonds, Rank::King),
            Card::new(Suit::Hearts, Rank::Nine),
        ];
        assert_eq!(longest_suit(&hand), Suit::Hearts);
    }

    #[test]
    fn test_current_winner_partial_trick() {
        let plays = vec![
            (0, Card::new(Suit::Clubs, Rank::Seven)),
            (1, Card::new(Suit::Hearts, Rank::Two)),
        ];
        assert_eq!(
            current_winner(plays, Suit::Hearts),
            Some((1, Card::new(Suit::Hearts, Rank::Two)))
        );
    }

    #[test]
    fn test_bot_idle_without_round() {
        let game = GameState::new("ROOM");
        let mut bot = Bot::with_seed(0, BotDifficulty::Medium, 1);
        assert_eq!(bot.choose_action(&game), None);
    }
}
