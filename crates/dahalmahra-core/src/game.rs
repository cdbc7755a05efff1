//! Game session.
//!
//! This module contains the `GameState` struct: the seats, the partnerships,
//! the active round and the history of finished rounds.

use crate::actions::{GameAction, GameEvent};
use crate::card::{Card, Suit};
use crate::dealer::draw_for_dealer;
use crate::player::{Player, PlayerId, Team, TeamName, NUM_PLAYERS};
use crate::round::{RoundPhase, RoundState};
use crate::scoring::TeamScores;
use crate::trick::Trick;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Unknown player")]
    InvalidPlayer,

    #[error("Game is full")]
    GameFull,

    #[error("Seat is already taken")]
    SeatOccupied,

    #[error("Teams need exactly 4 players")]
    NotEnoughPlayers,

    #[error("Teams have not been set up")]
    TeamsNotSet,

    #[error("A round is already in progress")]
    RoundInProgress,

    #[error("Master suit can only be chosen during master selection")]
    NotMasterSelection,

    #[error("Only the master caller may choose the master suit")]
    NotMasterCaller,

    #[error("Not in the playing phase.")]
    NotPlayingPhase,

    #[error("It is not your turn.")]
    NotYourTurn,

    #[error("Card not in hand.")]
    CardNotInHand,

    #[error("You must follow the leading suit.")]
    MustFollowSuit,

    #[error("No round is in progress")]
    NoActiveRound,

    #[error("Trick is not complete")]
    TrickIncomplete,

    #[error("Round is not complete")]
    RoundIncomplete,
}

impl GameError {
    /// Errors that mean the caller drove the engine out of order, as opposed
    /// to a player breaking a rule.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GameError::NoActiveRound | GameError::TrickIncomplete | GameError::RoundIncomplete
        )
    }
}

/// The complete game state of one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub room_id: String,
    /// Seats in join order; a player's index is their id
    pub players: Vec<Player>,
    /// Empty until all four seats are filled
    pub teams: Vec<Team>,
    pub current_round: Option<RoundState>,
    /// Finished rounds, oldest first
    pub past_rounds: Vec<RoundState>,
}

impl GameState {
    /// Create an empty game for a room
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            players: Vec::with_capacity(NUM_PLAYERS),
            teams: Vec::new(),
            current_round: None,
            past_rounds: Vec::new(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= NUM_PLAYERS
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    /// Whether every seat is filled and connected
    pub fn all_connected(&self) -> bool {
        self.is_full() && self.players.iter().all(|p| p.connected)
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.connected).count()
    }

    /// Lowest seat whose player has disconnected
    pub fn first_open_seat(&self) -> Option<PlayerId> {
        self.players.iter().find(|p| !p.connected).map(|p| p.id)
    }

    /// Seat a new player at the next id
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId, GameError> {
        if self.is_full() {
            return Err(GameError::GameFull);
        }
        let id = self.players.len() as PlayerId;
        self.players.push(Player::new(id, name.into()));
        Ok(id)
    }

    /// Mark a seat as disconnected. The seat keeps its id and team so the
    /// other players' ids stay valid.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        let player = self.get_player_mut(id).ok_or(GameError::InvalidPlayer)?;
        player.connected = false;
        Ok(vec![GameEvent::PlayerDisconnected { player: id }])
    }

    /// Put someone back into a disconnected seat
    pub fn reconnect_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
    ) -> Result<Vec<GameEvent>, GameError> {
        let player = self.get_player_mut(id).ok_or(GameError::InvalidPlayer)?;
        if player.connected {
            return Err(GameError::SeatOccupied);
        }
        player.name = name.into();
        player.connected = true;
        Ok(vec![GameEvent::PlayerReconnected {
            player: id,
            name: player.name.clone(),
        }])
    }

    /// Pair seats 0 & 2 as Black and 1 & 3 as Red
    pub fn set_up_teams(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.players.len() != NUM_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        self.teams = vec![
            Team::pairing(TeamName::Black),
            Team::pairing(TeamName::Red),
        ];
        for player in &mut self.players {
            player.team = Some(TeamName::for_player(player.id));
        }

        Ok(vec![GameEvent::TeamsFormed {
            teams: self.teams.clone(),
        }])
    }

    pub fn has_teams(&self) -> bool {
        !self.teams.is_empty()
    }

    /// Start the next round using the thread RNG
    pub fn start_new_round(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let mut rng = rand::thread_rng();
        self.start_new_round_with_rng(&mut rng)
    }

    /// Start the next round: pick the dealer, deal five cards each and wait
    /// for the master suit.
    pub fn start_new_round_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        if !self.has_teams() {
            return Err(GameError::TeamsNotSet);
        }
        if self.current_round.is_some() {
            return Err(GameError::RoundInProgress);
        }

        let dealer = self.next_dealer_id().unwrap_or_else(|| draw_for_dealer(rng));
        let round_number = self.past_rounds.len() as u32 + 1;
        let round = RoundState::start(round_number, dealer, rng);
        let event = GameEvent::RoundStarted {
            round_number,
            dealer,
            master_caller: round.master_caller_id,
        };
        self.current_round = Some(round);

        Ok(vec![event])
    }

    /// Dealer of the next round as decided by the last finished round
    pub fn next_dealer_id(&self) -> Option<PlayerId> {
        self.past_rounds.last().and_then(|r| r.next_dealer_id)
    }

    pub fn last_round(&self) -> Option<&RoundState> {
        self.past_rounds.last()
    }

    pub fn choose_master_suit(
        &mut self,
        player: PlayerId,
        suit: Suit,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.check_player(player)?;
        let round = self
            .current_round
            .as_mut()
            .ok_or(GameError::NoActiveRound)?;
        Ok(vec![round.choose_master_suit(player, suit)?])
    }

    /// Play a card. When this completes the round it is archived.
    pub fn play_card(&mut self, player: PlayerId, card: Card) -> Result<Vec<GameEvent>, GameError> {
        self.check_player(player)?;
        let round = self
            .current_round
            .as_mut()
            .ok_or(GameError::NotPlayingPhase)?;
        let events = round.play_card(player, card)?;

        if round.is_finished() {
            self.archive_round();
        }

        Ok(events)
    }

    fn archive_round(&mut self) {
        if let Some(round) = self.current_round.take() {
            self.past_rounds.push(round);
        }
    }

    /// Apply an in-round action on behalf of a seat
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        match action {
            GameAction::ChooseMasterSuit(suit) => self.choose_master_suit(player, suit),
            GameAction::PlayCard(card) => self.play_card(player, card),
        }
    }

    /// Legal cards for a seat; empty when no round is running
    pub fn playable_cards(&self, player: PlayerId) -> Vec<Card> {
        self.current_round
            .as_ref()
            .map(|r| r.playable_cards(player))
            .unwrap_or_default()
    }

    /// Seat whose turn it is to play
    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_round.as_ref().and_then(RoundState::current_turn)
    }

    /// Hand of a seat in the active round
    pub fn hand(&self, player: PlayerId) -> Vec<Card> {
        self.current_round
            .as_ref()
            .map(|r| r.hand(player).to_vec())
            .unwrap_or_default()
    }

    fn check_player(&self, player: PlayerId) -> Result<(), GameError> {
        if self.get_player(player).is_none() {
            return Err(GameError::InvalidPlayer);
        }
        Ok(())
    }

    /// What a single seat is allowed to see
    pub fn view_for(&self, player: PlayerId) -> Result<PlayerView, GameError> {
        self.check_player(player)?;

        Ok(PlayerView {
            room_id: self.room_id.clone(),
            player_id: player,
            players: self.players.clone(),
            teams: self.teams.clone(),
            round: self.current_round.as_ref().map(|r| RoundView::new(r, player)),
            rounds_played: self.past_rounds.len() as u32,
            last_round: self.last_round().map(RoundSummary::from),
        })
    }
}

/// Game state as seen from one seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub room_id: String,
    pub player_id: PlayerId,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub round: Option<RoundView>,
    pub rounds_played: u32,
    pub last_round: Option<RoundSummary>,
}

/// Active round as seen from one seat; other hands are only counted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub round_number: u32,
    pub phase: RoundPhase,
    pub dealer_id: PlayerId,
    pub master_caller_id: PlayerId,
    pub master_suit: Option<Suit>,
    pub your_hand: Vec<Card>,
    pub hand_sizes: [usize; NUM_PLAYERS],
    pub current_trick: Option<Trick>,
    pub last_trick: Option<Trick>,
    pub tricks_played: usize,
    pub scores: TeamScores,
    pub current_turn: Option<PlayerId>,
    pub playable_cards: Vec<Card>,
}

impl RoundView {
    fn new(round: &RoundState, player: PlayerId) -> Self {
        let mut hand_sizes = [0; NUM_PLAYERS];
        for (size, hand) in hand_sizes.iter_mut().zip(round.hands.iter()) {
            *size = hand.len();
        }

        Self {
            round_number: round.round_number,
            phase: round.phase,
            dealer_id: round.dealer_id,
            master_caller_id: round.master_caller_id,
            master_suit: round.master_suit,
            your_hand: round.hand(player).to_vec(),
            hand_sizes,
            current_trick: round.current_trick.clone(),
            last_trick: round.played_tricks.last().cloned(),
            tricks_played: round.played_tricks.len(),
            scores: round.scores,
            current_turn: round.current_turn(),
            playable_cards: round.playable_cards(player),
        }
    }
}

/// Outcome of a finished round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_number: u32,
    pub dealer_id: PlayerId,
    pub master_suit: Option<Suit>,
    pub scores: TeamScores,
    pub winner: Option<TeamName>,
    pub kot: bool,
    pub next_dealer_id: Option<PlayerId>,
}

impl From<&RoundState> for RoundSummary {
    fn from(round: &RoundState) -> Self {
        Self {
            round_number: round.round_number,
            dealer_id: round.dealer_id,
            master_suit: round.master_suit,
            scores: round.scores,
            winner: round.round_winner,
            kot: round.scores.is_kot(),
            next_dealer_id: round.next_dealer_id,
        }
    }
}
