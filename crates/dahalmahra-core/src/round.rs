//! Round state machine.
//!
//! A round moves through `Dealing -> MasterSelection -> Playing -> Finished`.
//! Every transition validates first and only mutates once it cannot fail.

use crate::actions::GameEvent;
use crate::card::{create_deck, shuffle_deck, Card, Suit};
use crate::dealer::next_dealer;
use crate::game::GameError;
use crate::player::{seat_after, PlayerId, TeamName, NUM_PLAYERS};
use crate::scoring::TeamScores;
use crate::trick::{Trick, TRICKS_PER_ROUND};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cards per player in the deal before the master suit is called
pub const FIRST_DEAL: usize = 5;

/// Cards per player in the deal after the master suit is called
pub const SECOND_DEAL: usize = 8;

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Cards are being dealt
    Dealing,
    /// Waiting for the master caller to name a suit
    MasterSelection,
    /// Tricks are being played
    Playing,
    /// All tricks played, outcome recorded
    Finished,
}

/// State of a single round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// 1-based, counted across the whole game
    pub round_number: u32,
    /// Hands indexed by seat
    pub hands: [Vec<Card>; NUM_PLAYERS],
    /// Undealt cards; dealing draws from the end
    pub deck: Vec<Card>,
    pub dealer_id: PlayerId,
    /// Seat clockwise of the dealer
    pub master_caller_id: PlayerId,
    pub master_suit: Option<Suit>,
    /// Trick being played; `None` once the round is finished
    pub current_trick: Option<Trick>,
    pub played_tricks: Vec<Trick>,
    pub scores: TeamScores,
    pub phase: RoundPhase,
    pub round_winner: Option<TeamName>,
    pub next_dealer_id: Option<PlayerId>,
}

impl RoundState {
    /// Create a round from an already shuffled deck, before anything is dealt.
    pub fn new(round_number: u32, dealer_id: PlayerId, deck: Vec<Card>) -> Self {
        let master_caller_id = seat_after(dealer_id, 1);
        Self {
            round_number,
            hands: Default::default(),
            deck,
            dealer_id,
            master_caller_id,
            master_suit: None,
            current_trick: Some(Trick::new(1, master_caller_id)),
            played_tricks: Vec::with_capacity(TRICKS_PER_ROUND),
            scores: TeamScores::default(),
            phase: RoundPhase::Dealing,
            round_winner: None,
            next_dealer_id: None,
        }
    }

    /// Shuffle a fresh deck, deal five cards to each seat and wait for the master suit.
    pub fn start<R: Rng + ?Sized>(round_number: u32, dealer_id: PlayerId, rng: &mut R) -> Self {
        let deck = shuffle_deck(&create_deck(), rng);
        Self::start_with_deck(round_number, dealer_id, deck)
    }

    /// Like [`RoundState::start`] with a caller-supplied deck order.
    pub fn start_with_deck(round_number: u32, dealer_id: PlayerId, deck: Vec<Card>) -> Self {
        let mut round = Self::new(round_number, dealer_id, deck);
        round.deal(FIRST_DEAL);
        round.phase = RoundPhase::MasterSelection;
        round
    }

    /// Deal `per_player` cards to each seat, one at a time round-robin.
    fn deal(&mut self, per_player: usize) {
        for _ in 0..per_player {
            for hand in self.hands.iter_mut() {
                if let Some(card) = self.deck.pop() {
                    hand.push(card);
                }
            }
        }
    }

    pub fn hand(&self, player: PlayerId) -> &[Card] {
        self.hands
            .get(player as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RoundPhase::Finished
    }

    /// Seat expected to play next, if cards are being played
    pub fn current_turn(&self) -> Option<PlayerId> {
        if self.phase != RoundPhase::Playing {
            return None;
        }
        self.current_trick.as_ref().map(Trick::current_turn)
    }

    /// Name the master suit and deal the remaining cards.
    pub fn choose_master_suit(
        &mut self,
        player: PlayerId,
        suit: Suit,
    ) -> Result<GameEvent, GameError> {
        if self.phase != RoundPhase::MasterSelection {
            return Err(GameError::NotMasterSelection);
        }
        if player != self.master_caller_id {
            return Err(GameError::NotMasterCaller);
        }

        self.master_suit = Some(suit);
        self.deal(SECOND_DEAL);
        self.phase = RoundPhase::Playing;

        Ok(GameEvent::MasterSuitChosen { player, suit })
    }

    /// Legal cards for a seat under the follow-suit rule, regardless of turn.
    pub fn playable_cards(&self, player: PlayerId) -> Vec<Card> {
        let hand = self.hand(player);
        let leading_suit = self.current_trick.as_ref().and_then(|t| t.leading_suit);

        match leading_suit {
            Some(suit) if hand.iter().any(|c| c.suit == suit) => {
                hand.iter().filter(|c| c.suit == suit).copied().collect()
            }
            _ => hand.to_vec(),
        }
    }

    /// Check a play without changing anything.
    pub fn validate_play(&self, player: PlayerId, card: Card) -> Result<(), GameError> {
        if self.phase != RoundPhase::Playing {
            return Err(GameError::NotPlayingPhase);
        }
        let trick = self
            .current_trick
            .as_ref()
            .ok_or(GameError::NotPlayingPhase)?;

        if player != trick.current_turn() {
            return Err(GameError::NotYourTurn);
        }

        let hand = self.hand(player);
        if !hand.contains(&card) {
            return Err(GameError::CardNotInHand);
        }

        if let Some(leading) = trick.leading_suit {
            if card.suit != leading && hand.iter().any(|c| c.suit == leading) {
                return Err(GameError::MustFollowSuit);
            }
        }

        Ok(())
    }

    /// Play a card. A fourth card resolves the trick, and the thirteenth
    /// trick finishes the round.
    pub fn play_card(&mut self, player: PlayerId, card: Card) -> Result<Vec<GameEvent>, GameError> {
        self.validate_play(player, card)?;

        let hand = &mut self.hands[player as usize];
        if let Some(pos) = hand.iter().position(|c| *c == card) {
            hand.remove(pos);
        }

        let trick = self
            .current_trick
            .as_mut()
            .ok_or(GameError::NotPlayingPhase)?;
        trick.add_play(player, card);
        let complete = trick.is_complete();

        let mut events = vec![GameEvent::CardPlayed { player, card }];
        if complete {
            events.extend(self.end_trick()?);
        }
        Ok(events)
    }

    /// Resolve the current trick, recompute scores and open the next trick
    /// or finish the round.
    pub fn end_trick(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let master_suit = match (self.phase, self.master_suit) {
            (RoundPhase::Playing, Some(suit)) => suit,
            _ => return Err(GameError::NotPlayingPhase),
        };

        let winner = self
            .current_trick
            .as_ref()
            .and_then(|t| t.winner(master_suit))
            .ok_or(GameError::TrickIncomplete)?;
        let mut trick = self
            .current_trick
            .take()
            .ok_or(GameError::TrickIncomplete)?;

        trick.winner_id = Some(winner);
        let trick_id = trick.id;
        self.played_tricks.push(trick);
        self.scores = TeamScores::from_tricks(&self.played_tricks);

        let mut events = vec![GameEvent::TrickWon {
            trick_id,
            winner,
            scores: self.scores,
        }];

        if self.played_tricks.len() < TRICKS_PER_ROUND {
            self.current_trick = Some(Trick::new(trick_id + 1, winner));
        } else {
            events.push(self.finish()?);
        }

        Ok(events)
    }

    /// Record the outcome of a completed round and the next dealer.
    pub fn finish(&mut self) -> Result<GameEvent, GameError> {
        if self.played_tricks.len() != TRICKS_PER_ROUND || self.phase != RoundPhase::Playing {
            return Err(GameError::RoundIncomplete);
        }

        let scores = TeamScores::from_tricks(&self.played_tricks);
        let winner = scores.winner();
        let kot = scores.is_kot();
        let dealer_team_won = winner == TeamName::for_player(self.dealer_id);
        let next = next_dealer(self.dealer_id, dealer_team_won, kot);

        self.scores = scores;
        self.round_winner = Some(winner);
        self.next_dealer_id = Some(next);
        self.current_trick = None;
        self.phase = RoundPhase::Finished;

        Ok(GameEvent::RoundFinished {
            round_number: self.round_number,
            winner,
            scores,
            kot,
            next_dealer: next,
        })
    }

    /// Every card the round currently accounts for, wherever it sits
    pub fn all_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.hands.iter().flatten().copied().collect();
        cards.extend(self.deck.iter().copied());
        cards.extend(self.played_tricks.iter().flat_map(|t| t.cards_played.iter().map(|p| p.card)));
        if let Some(trick) = &self.current_trick {
            cards.extend(trick.cards_played.iter().map(|p| p.card));
        }
        cards
    }
}
