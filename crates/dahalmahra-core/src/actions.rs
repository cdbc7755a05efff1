//! Actions players can take during a round.
//!
//! This module defines the actions a seat can submit and the events that
//! result from applying them.

use crate::card::{Card, Suit};
use crate::player::{PlayerId, Team, TeamName};
use crate::scoring::TeamScores;
use serde::{Deserialize, Serialize};

/// All possible in-round actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Master caller names the trump suit for the round
    ChooseMasterSuit(Suit),
    /// Play a card to the current trick
    PlayCard(Card),
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A seat went empty; its id and team are kept
    PlayerDisconnected { player: PlayerId },

    /// A disconnected seat was taken again
    PlayerReconnected { player: PlayerId, name: String },

    /// All four seats filled and partnerships assigned
    TeamsFormed { teams: Vec<Team> },

    /// A round was dealt its first five cards per player
    RoundStarted {
        round_number: u32,
        dealer: PlayerId,
        master_caller: PlayerId,
    },

    /// The master suit was named and the remaining cards dealt
    MasterSuitChosen { player: PlayerId, suit: Suit },

    /// A card was laid on the current trick
    CardPlayed { player: PlayerId, card: Card },

    /// A trick was resolved
    TrickWon {
        trick_id: u8,
        winner: PlayerId,
        scores: TeamScores,
    },

    /// All thirteen tricks were played
    RoundFinished {
        round_number: u32,
        winner: TeamName,
        scores: TeamScores,
        kot: bool,
        next_dealer: PlayerId,
    },
}
