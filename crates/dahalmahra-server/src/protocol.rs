//! WebSocket protocol messages for Dahalmahra multiplayer.

use dahalmahra_core::{Card, Player, PlayerId, PlayerView, Suit, TeamName, TeamScores};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Open a new room and take seat 0
    CreateRoom { player_name: String },

    /// Join an existing room by its code
    JoinRoom { room_id: String, player_name: String },

    /// Leave current room
    LeaveRoom,

    /// Master caller names the trump suit
    ChooseMasterSuit { suit: Suit },

    /// Play a card to the current trick
    PlayCard { card: Card },

    /// Request this seat's view of the game
    GetGameState,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the connection ID
    Welcome { connection_id: Uuid },

    /// Room created and seat 0 taken
    RoomCreated {
        room_id: String,
        player_id: PlayerId,
        players: Vec<PlayerInfo>,
    },

    /// Seat taken in an existing room
    RoomJoined {
        room_id: String,
        player_id: PlayerId,
        players: Vec<PlayerInfo>,
    },

    /// Could not join a room
    JoinError { message: String },

    /// Seats changed
    LobbyUpdate {
        room_id: String,
        players: Vec<PlayerInfo>,
    },

    /// Left room successfully
    LeftRoom,

    /// First round dealt; sent to each seat with its own hand
    GameStarted {
        your_hand: Vec<Card>,
        player_id: PlayerId,
        players: Vec<PlayerInfo>,
        master_caller_id: PlayerId,
        round_number: u32,
    },

    /// Later round dealt; sent to each seat with its own hand
    NewRoundStarted {
        your_hand: Vec<Card>,
        round_number: u32,
        dealer_id: PlayerId,
        master_caller_id: PlayerId,
    },

    /// Sent to the master caller only
    PromptMasterSuit,

    /// Master suit announced to the table
    MasterSuitChosen { player_id: PlayerId, master_suit: Suit },

    /// Full thirteen-card hand after the second deal
    FinalDeal { your_hand: Vec<Card>, player_id: PlayerId },

    /// Whose turn it is, with their legal cards
    TurnChanged {
        current_player_id: PlayerId,
        playable_cards: Vec<Card>,
    },

    /// A card hit the table
    CardPlayed {
        player_id: PlayerId,
        player_name: String,
        card: Card,
    },

    /// A trick was resolved
    TrickResult {
        trick_id: u8,
        winner_id: PlayerId,
        winner_name: String,
        scores: TeamScores,
    },

    /// All thirteen tricks played
    RoundResult {
        round_number: u32,
        round_winner: TeamName,
        scores: TeamScores,
        kot: bool,
        next_dealer_id: PlayerId,
    },

    /// A seat lost its connection
    PlayerDisconnected { player_id: PlayerId },

    /// A disconnected seat was taken again
    PlayerReconnected { player_id: PlayerId, player_name: String },

    /// This seat's view of the game
    GameStateUpdate { view: PlayerView },

    /// Outcome of a submitted action
    ActionResult { success: bool, message: String },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// Seat information for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub team: Option<TeamName>,
    pub connected: bool,
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            team: player.team,
            connected: player.connected,
        }
    }
}
