//! Dealer selection and rotation.

use crate::card::{create_deck, shuffle_deck, Card};
use crate::player::{seat_after, PlayerId, NUM_PLAYERS};
use rand::Rng;

/// Pick the first dealer from one card per seat: the lowest value deals.
///
/// `draws[i]` is the card drawn by seat `i`. Equal values go to the lower seat.
pub fn dealer_from_draw(draws: &[Card; NUM_PLAYERS]) -> PlayerId {
    let mut dealer = 0;
    for (seat, card) in draws.iter().enumerate().skip(1) {
        if card.value() < draws[dealer].value() {
            dealer = seat;
        }
    }
    dealer as PlayerId
}

/// Draw one card per seat from a fresh shuffle and pick the first dealer.
pub fn draw_for_dealer<R: Rng + ?Sized>(rng: &mut R) -> PlayerId {
    let deck = shuffle_deck(&create_deck(), rng);
    let draws = [deck[0], deck[1], deck[2], deck[3]];
    dealer_from_draw(&draws)
}

/// Next round's dealer.
///
/// | Dealer's team | Kot | Next dealer            |
/// |---------------|-----|------------------------|
/// | won           | no  | clockwise              |
/// | won           | yes | anti-clockwise         |
/// | lost          | no  | same dealer again      |
/// | lost          | yes | dealer's teammate      |
pub fn next_dealer(dealer: PlayerId, dealer_team_won: bool, kot: bool) -> PlayerId {
    match (dealer_team_won, kot) {
        (true, false) => seat_after(dealer, 1),
        (true, true) => seat_after(dealer, 3),
        (false, false) => dealer,
        (false, true) => seat_after(dealer, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_next_dealer_table() {
        assert_eq!(next_dealer(1, false, false), 1);
        assert_eq!(next_dealer(1, true, true), 0);
        assert_eq!(next_dealer(2, false, true), 0);
        assert_eq!(next_dealer(3, true, false), 0);
        assert_eq!(next_dealer(0, true, true), 3);
        assert_eq!(next_dealer(3, false, true), 1);
    }

    #[test]
    fn test_lowest_draw_deals() {
        let draws = [
            Card::new(Suit::Hearts, Rank::King),
            Card::new(Suit::Clubs, Rank::Nine),
            Card::new(Suit::Spades, Rank::Three),
            Card::new(Suit::Diamonds, Rank::Ace),
        ];
        assert_eq!(dealer_from_draw(&draws), 2);
    }

    #[test]
    fn test_equal_values_go_to_lower_seat() {
        let draws = [
            Card::new(Suit::Hearts, Rank::King),
            Card::new(Suit::Clubs, Rank::Four),
            Card::new(Suit::Spades, Rank::Jack),
            Card::new(Suit::Diamonds, Rank::Four),
        ];
        assert_eq!(dealer_from_draw(&draws), 1);
    }

    #[test]
    fn test_draw_for_dealer_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert!((draw_for_dealer(&mut rng) as usize) < NUM_PLAYERS);
        }
    }
}
