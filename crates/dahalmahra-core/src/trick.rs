//! Tricks and trick resolution.

use crate::card::{Card, Suit};
use crate::player::{seat_after, PlayerId, NUM_PLAYERS};
use serde::{Deserialize, Serialize};

/// Number of tricks in a round
pub const TRICKS_PER_ROUND: usize = 13;

/// One card laid on a trick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub player_id: PlayerId,
    pub card: Card,
}

/// A single trick of four plays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    /// 1-based index within the round
    pub id: u8,
    pub lead_player_id: PlayerId,
    /// Suit of the first card played
    pub leading_suit: Option<Suit>,
    /// Plays in the order they were made
    pub cards_played: Vec<Play>,
    /// Set once the trick is resolved
    pub winner_id: Option<PlayerId>,
}

impl Trick {
    pub fn new(id: u8, lead_player_id: PlayerId) -> Self {
        Self {
            id,
            lead_player_id,
            leading_suit: None,
            cards_played: Vec::with_capacity(NUM_PLAYERS),
            winner_id: None,
        }
    }

    /// Seat expected to play next
    pub fn current_turn(&self) -> PlayerId {
        seat_after(self.lead_player_id, self.cards_played.len() as u8)
    }

    pub fn is_complete(&self) -> bool {
        self.cards_played.len() == NUM_PLAYERS
    }

    /// Record a play. The first card fixes the leading suit.
    pub(crate) fn add_play(&mut self, player_id: PlayerId, card: Card) {
        if self.cards_played.is_empty() {
            self.leading_suit = Some(card.suit);
        }
        self.cards_played.push(Play { player_id, card });
    }

    /// Number of tens contained in this trick
    pub fn tens(&self) -> u32 {
        self.cards_played.iter().filter(|p| p.card.is_ten()).count() as u32
    }

    /// Determine the winner of a complete trick under the given master suit.
    ///
    /// Returns `None` while fewer than four cards have been played.
    pub fn winner(&self, master_suit: Suit) -> Option<PlayerId> {
        if !self.is_complete() {
            return None;
        }

        let mut plays = self.cards_played.iter();
        let mut best = *plays.next()?;

        for play in plays {
            if beats(play.card, best.card, master_suit) {
                best = *play;
            }
        }

        Some(best.player_id)
    }
}

/// Whether `challenger` takes the trick from the card currently winning it.
///
/// Master beats non-master. Otherwise only a higher card of the winning
/// card's own suit can take over, so off-suit discards never win.
fn beats(challenger: Card, winning: Card, master_suit: Suit) -> bool {
    let challenger_master = challenger.suit == master_suit;
    let winning_master = winning.suit == master_suit;

    match (challenger_master, winning_master) {
        (true, false) => true,
        (false, true) => false,
        _ => challenger.suit == winning.suit && challenger.value() > winning.value(),
    }
}
