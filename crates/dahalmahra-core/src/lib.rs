//! Dahalmahra - a four-player partnership trick-taking card game engine
//!
//! This crate provides the rules engine for Dahalmahra, including:
//! - The 52-card deck and shuffling
//! - Seats and the fixed Black/Red partnerships
//! - The round state machine with the two-stage deal and master suit
//! - Trick resolution, scoring and Kot detection
//! - Dealer rotation between rounds
//!
//! # Architecture
//!
//! The engine knows nothing about connections. Every transition takes
//! `&mut GameState`, validates first and returns either the resulting
//! events or a [`GameError`] with the state left untouched. It can be
//! compiled natively for the server or to WebAssembly for a local game.
//!
//! # Modules
//!
//! - [`card`]: Suits, ranks, the deck and shuffling
//! - [`player`]: Seats and teams
//! - [`trick`]: Tricks and trick resolution
//! - [`scoring`]: Tens, tricks and the round winner
//! - [`dealer`]: First dealer draw and dealer rotation
//! - [`round`]: Round state machine
//! - [`game`]: Game session

pub mod actions;
pub mod bot;
pub mod card;
pub mod dealer;
pub mod game;
pub mod player;
pub mod round;
pub mod scoring;
pub mod trick;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use bot::{Bot, BotDifficulty};
pub use card::{create_deck, shuffle_deck, Card, Rank, Suit, DECK_SIZE};
pub use dealer::{dealer_from_draw, next_dealer};
pub use game::{GameError, GameState, PlayerView, RoundSummary, RoundView};
pub use player::{Player, PlayerId, Team, TeamName, NUM_PLAYERS};
pub use round::{RoundPhase, RoundState};
pub use scoring::{TeamScore, TeamScores};
pub use trick::{Play, Trick, TRICKS_PER_ROUND};
