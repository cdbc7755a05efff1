//! Cards, the 52-card deck and shuffling.
//!
//! This module contains:
//! - `Suit` and `Rank` as closed enums
//! - `Card` with its fixed rank-to-value mapping
//! - Deck creation and a non-mutating shuffle

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cards in a full deck
pub const DECK_SIZE: usize = 52;

/// Card suit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    /// All suits in canonical deck order
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    /// Unicode symbol for display
    pub fn symbol(&self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }
}

/// Card rank, two through ace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// All ranks in ascending order
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric value used for trick comparison (2..=14)
    pub fn value(&self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// A playing card.
///
/// On the wire a card is `{"suit", "rank", "value"}`. The value is always
/// derived from the rank, so an incoming value is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "CardWire", from = "CardWire")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Comparison value of this card
    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    /// Whether this card is one of the four tens
    pub fn is_ten(&self) -> bool {
        self.rank == Rank::Ten
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

#[derive(Serialize, Deserialize)]
struct CardWire {
    suit: Suit,
    rank: Rank,
    #[serde(default)]
    value: u8,
}

impl From<Card> for CardWire {
    fn from(card: Card) -> Self {
        Self {
            suit: card.suit,
            rank: card.rank,
            value: card.value(),
        }
    }
}

impl From<CardWire> for Card {
    fn from(wire: CardWire) -> Self {
        Card::new(wire.suit, wire.rank)
    }
}

/// Create the full deck in canonical (suit, rank) order.
///
/// The order only matters as the input to [`shuffle_deck`].
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

/// Return a uniformly shuffled copy of `deck`, leaving the input untouched.
pub fn shuffle_deck<R: Rng + ?Sized>(deck: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_deck_has_52_unique_cards() {
        let deck = create_deck();
        assert_eq!(deck.len(), DECK_SIZE);

        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn test_rank_values() {
        assert_eq!(Rank::Two.value(), 2);
        assert_eq!(Rank::Ten.value(), 10);
        assert_eq!(Rank::Jack.value(), 11);
        assert_eq!(Rank::Queen.value(), 12);
        assert_eq!(Rank::King.value(), 13);
        assert_eq!(Rank::Ace.value(), 14);
    }

    #[test]
    fn test_deck_has_four_tens() {
        let tens = create_deck().iter().filter(|c| c.is_ten()).count();
        assert_eq!(tens, 4);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let deck = create_deck();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let shuffled = shuffle_deck(&deck, &mut rng);
            assert_eq!(shuffled.len(), deck.len());

            let original: HashSet<Card> = deck.iter().copied().collect();
            let permuted: HashSet<Card> = shuffled.iter().copied().collect();
            assert_eq!(original, permuted);
        }
    }

    #[test]
    fn test_shuffle_does_not_mutate_input() {
        let deck = create_deck();
        let before = deck.clone();
        let mut rng = StdRng::seed_from_u64(1);
        let _ = shuffle_deck(&deck, &mut rng);
        assert_eq!(deck, before);
    }

    #[test]
    fn test_card_json_format() {
        let card = Card::new(Suit::Hearts, Rank::Ten);
        let json = serde_json::to_value(card).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"suit": "Hearts", "rank": "10", "value": 10})
        );

        let parsed: Card =
            serde_json::from_str(r#"{"suit":"Clubs","rank":"Queen","value":99}"#).unwrap();
        assert_eq!(parsed, Card::new(Suit::Clubs, Rank::Queen));
        assert_eq!(parsed.value(), 12);

        let no_value: Card = serde_json::from_str(r#"{"suit":"Spades","rank":"2"}"#).unwrap();
        assert_eq!(no_value, Card::new(Suit::Spades, Rank::Two));
    }

    #[test]
    fn test_unknown_suit_rejected() {
        let parsed = serde_json::from_str::<Card>(r#"{"suit":"Stars","rank":"2"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Card::new(Suit::Spades, Rank::King).to_string(), "K♠");
        assert_eq!(Card::new(Suit::Diamonds, Rank::Ten).to_string(), "10♦");
    }
}
