//! WebSocket server and connection handling.
//!
//! Every room lives in one `DashMap` entry. Handlers hold the entry's lock for
//! the whole transition, which serializes moves within a room while other
//! rooms proceed independently.

use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::{generate_room_code, GameRoom, RoomError};
use dahalmahra_core::{GameAction, GameEvent, PlayerId, RoundPhase};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    pub config: ServerConfig,
    /// All open rooms by code
    pub rooms: DashMap<String, GameRoom>,
    /// Mapping from connection ID to their room code
    pub player_rooms: DashMap<Uuid, String>,
    /// Mapping from connection ID to their message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to_player(&self, connection_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&connection_id) {
            let _ = sender.send(msg);
        }
    }

    /// Send a message to every occupied seat of a room.
    ///
    /// Takes the room itself so callers can broadcast while holding its lock.
    pub fn broadcast_to_room(&self, room: &GameRoom, msg: ServerMessage) {
        for (_, connection_id) in room.occupied_seats() {
            self.send_to_player(connection_id, msg.clone());
        }
    }

    /// Send a message built per seat to every occupied seat of a room.
    pub fn send_per_seat<F>(&self, room: &GameRoom, build: F)
    where
        F: Fn(PlayerId) -> Option<ServerMessage>,
    {
        for (seat, connection_id) in room.occupied_seats() {
            if let Some(msg) = build(seat) {
                self.send_to_player(connection_id, msg);
            }
        }
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Dahalmahra server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let welcome = ServerMessage::Welcome { connection_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Registered only after the welcome went out
    state.player_senders.insert(connection_id, tx);

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(connection_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", connection_id, e);
                    state.send_to_player(
                        connection_id,
                        ServerMessage::Error {
                            message: format!("Invalid message: {}", e),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", connection_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(connection_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    leave_room(connection_id, &state);
    state.player_senders.remove(&connection_id);
    send_task.abort();

    info!("Connection closed for {}", connection_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(connection_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateRoom { player_name } => create_room(connection_id, player_name, state),

        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => join_room(connection_id, room_id.to_uppercase(), player_name, state),

        ClientMessage::LeaveRoom => {
            if leave_room(connection_id, state) {
                state.send_to_player(connection_id, ServerMessage::LeftRoom);
            }
        }

        ClientMessage::ChooseMasterSuit { suit } => {
            apply_action(connection_id, GameAction::ChooseMasterSuit(suit), state)
        }

        ClientMessage::PlayCard { card } => {
            apply_action(connection_id, GameAction::PlayCard(card), state)
        }

        ClientMessage::GetGameState => {
            let Some(room_id) = room_of(connection_id, state) else {
                return;
            };
            if let Some(room) = state.rooms.get(&room_id) {
                if let Some(seat) = room.seat_of(connection_id) {
                    match room.game.view_for(seat) {
                        Ok(view) => {
                            state.send_to_player(connection_id, ServerMessage::GameStateUpdate { view })
                        }
                        Err(e) => warn!(room = %room_id, seat, "View unavailable: {}", e),
                    }
                }
            }
        }

        ClientMessage::Ping => {
            state.send_to_player(connection_id, ServerMessage::Pong);
        }
    }
}

fn room_of(connection_id: Uuid, state: &ServerState) -> Option<String> {
    state
        .player_rooms
        .get(&connection_id)
        .map(|entry| entry.value().clone())
}

fn send_error(state: &ServerState, connection_id: Uuid, message: String) {
    state.send_to_player(connection_id, ServerMessage::Error { message });
}

fn create_room(connection_id: Uuid, player_name: String, state: &Arc<ServerState>) {
    if state.player_rooms.contains_key(&connection_id) {
        send_error(state, connection_id, "Already in a room".to_string());
        return;
    }

    let mut rng = rand::thread_rng();
    loop {
        let code = generate_room_code(&mut rng);
        let Entry::Vacant(slot) = state.rooms.entry(code.clone()) else {
            continue;
        };

        let mut room = GameRoom::new(code.clone());
        let outcome = match room.join(connection_id, player_name) {
            Ok(outcome) => outcome,
            Err(e) => {
                send_error(state, connection_id, e.to_string());
                return;
            }
        };
        let players = room.players_info();
        slot.insert(room);
        state.player_rooms.insert(connection_id, code.clone());

        info!(room = %code, seat = outcome.seat, "Room created");
        state.send_to_player(
            connection_id,
            ServerMessage::RoomCreated {
                room_id: code.clone(),
                player_id: outcome.seat,
                players: players.clone(),
            },
        );
        state.send_to_player(
            connection_id,
            ServerMessage::LobbyUpdate {
                room_id: code,
                players,
            },
        );
        return;
    }
}

fn join_room(connection_id: Uuid, room_id: String, player_name: String, state: &Arc<ServerState>) {
    if state.player_rooms.contains_key(&connection_id) {
        state.send_to_player(
            connection_id,
            ServerMessage::JoinError {
                message: "Already in a room".to_string(),
            },
        );
        return;
    }

    let Some(mut room) = state.rooms.get_mut(&room_id) else {
        state.send_to_player(
            connection_id,
            ServerMessage::JoinError {
                message: RoomError::RoomNotFound.to_string(),
            },
        );
        return;
    };

    let outcome = match room.join(connection_id, player_name) {
        Ok(outcome) => outcome,
        Err(e) => {
            state.send_to_player(
                connection_id,
                ServerMessage::JoinError {
                    message: e.to_string(),
                },
            );
            return;
        }
    };
    state.player_rooms.insert(connection_id, room_id.clone());
    info!(room = %room_id, seat = outcome.seat, reconnected = outcome.reconnected, "Player joined");

    let players = room.players_info();
    state.send_to_player(
        connection_id,
        ServerMessage::RoomJoined {
            room_id: room_id.clone(),
            player_id: outcome.seat,
            players: players.clone(),
        },
    );
    state.broadcast_to_room(
        &room,
        ServerMessage::LobbyUpdate {
            room_id: room_id.clone(),
            players,
        },
    );

    if outcome.reconnected {
        state.broadcast_to_room(
            &room,
            ServerMessage::PlayerReconnected {
                player_id: outcome.seat,
                player_name: room.player_name(outcome.seat),
            },
        );
        if let Ok(view) = room.game.view_for(outcome.seat) {
            state.send_to_player(connection_id, ServerMessage::GameStateUpdate { view });
        }
    }

    if room.ready_to_start() {
        info!(room = %room_id, "Room is full. Starting game...");
        match room.start_game() {
            Ok(events) => {
                log_events(&room_id, None, &events);
                announce_events(state, &room, &events);
            }
            Err(e) => error!(room = %room_id, "Could not start game: {}", e),
        }
    } else if outcome.reconnected {
        if room.ready_for_next_round() {
            drop(room);
            schedule_next_round(Arc::clone(state), room_id);
        } else {
            prompt_current_seat(state, &room);
        }
    }
}

/// Vacate the connection's seat. Returns whether it was seated anywhere.
fn leave_room(connection_id: Uuid, state: &Arc<ServerState>) -> bool {
    let Some((_, room_id)) = state.player_rooms.remove(&connection_id) else {
        return false;
    };

    let abandoned = match state.rooms.get_mut(&room_id) {
        Some(mut room) => match room.leave(connection_id) {
            Ok((seat, events)) => {
                log_events(&room_id, Some(seat), &events);
                announce_events(state, &room, &events);
                state.broadcast_to_room(
                    &room,
                    ServerMessage::LobbyUpdate {
                        room_id: room_id.clone(),
                        players: room.players_info(),
                    },
                );
                room.is_abandoned()
            }
            Err(e) => {
                warn!(room = %room_id, "Leave failed for {}: {}", connection_id, e);
                false
            }
        },
        None => false,
    };

    if abandoned {
        state.rooms.remove(&room_id);
        info!(room = %room_id, "Room closed");
    }
    true
}

fn apply_action(connection_id: Uuid, action: GameAction, state: &Arc<ServerState>) {
    let Some(room_id) = room_of(connection_id, state) else {
        send_error(state, connection_id, "Not in a room".to_string());
        return;
    };
    let Some(mut room) = state.rooms.get_mut(&room_id) else {
        send_error(state, connection_id, RoomError::RoomNotFound.to_string());
        return;
    };

    let result = room.apply_action(connection_id, action);
    match result {
        Ok((seat, events)) => {
            log_events(&room_id, Some(seat), &events);
            state.send_to_player(
                connection_id,
                ServerMessage::ActionResult {
                    success: true,
                    message: "OK".to_string(),
                },
            );
            announce_events(state, &room, &events);

            let round_over = events
                .iter()
                .any(|e| matches!(e, GameEvent::RoundFinished { .. }));
            if round_over {
                drop(room);
                schedule_next_round(Arc::clone(state), room_id);
            }
        }
        Err(e) => {
            match &e {
                RoomError::Game(game_err) if game_err.is_internal() => {
                    error!(room = %room_id, ?action, "Engine driven out of order: {}", game_err)
                }
                _ => debug!(room = %room_id, ?action, "Rejected action: {}", e),
            }
            state.send_to_player(
                connection_id,
                ServerMessage::ActionResult {
                    success: false,
                    message: e.to_string(),
                },
            );
        }
    }
}

/// Deal the next round after the configured pause, provided every seat is
/// still connected and nobody started a round in the meantime.
fn schedule_next_round(state: Arc<ServerState>, room_id: String) {
    tokio::spawn(async move {
        tokio::time::sleep(state.config.next_round_delay).await;

        let Some(mut room) = state.rooms.get_mut(&room_id) else {
            return;
        };
        if !room.ready_for_next_round() {
            debug!(room = %room_id, "Next round postponed");
            return;
        }

        match room.start_next_round() {
            Ok(events) => {
                log_events(&room_id, None, &events);
                announce_events(&state, &room, &events);
            }
            Err(e) => error!(room = %room_id, "Could not start next round: {}", e),
        }
    });
}

fn log_events(room_id: &str, seat: Option<PlayerId>, events: &[GameEvent]) {
    for event in events {
        info!(room = %room_id, ?seat, ?event, "Game event");
    }
}

/// Translate engine events into messages for the table.
fn announce_events(state: &ServerState, room: &GameRoom, events: &[GameEvent]) {
    let mut turn_moved = false;

    for event in events {
        match event {
            GameEvent::TeamsFormed { .. } => {
                state.broadcast_to_room(
                    room,
                    ServerMessage::LobbyUpdate {
                        room_id: room.id.clone(),
                        players: room.players_info(),
                    },
                );
            }

            GameEvent::RoundStarted {
                round_number,
                dealer,
                master_caller,
            } => {
                let players = room.players_info();
                let first_round = *round_number == 1;
                state.send_per_seat(room, |seat| {
                    let your_hand = room.game.hand(seat);
                    Some(if first_round {
                        ServerMessage::GameStarted {
                            your_hand,
                            player_id: seat,
                            players: players.clone(),
                            master_caller_id: *master_caller,
                            round_number: *round_number,
                        }
                    } else {
                        ServerMessage::NewRoundStarted {
                            your_hand,
                            round_number: *round_number,
                            dealer_id: *dealer,
                            master_caller_id: *master_caller,
                        }
                    })
                });
                if let Some(conn) = room.connection_of(*master_caller) {
                    state.send_to_player(conn, ServerMessage::PromptMasterSuit);
                }
            }

            GameEvent::MasterSuitChosen { player, suit } => {
                state.broadcast_to_room(
                    room,
                    ServerMessage::MasterSuitChosen {
                        player_id: *player,
                        master_suit: *suit,
                    },
                );
                state.send_per_seat(room, |seat| {
                    Some(ServerMessage::FinalDeal {
                        your_hand: room.game.hand(seat),
                        player_id: seat,
                    })
                });
                turn_moved = true;
            }

            GameEvent::CardPlayed { player, card } => {
                state.broadcast_to_room(
                    room,
                    ServerMessage::CardPlayed {
                        player_id: *player,
                        player_name: room.player_name(*player),
                        card: *card,
                    },
                );
                turn_moved = true;
            }

            GameEvent::TrickWon {
                trick_id,
                winner,
                scores,
            } => {
                state.broadcast_to_room(
                    room,
                    ServerMessage::TrickResult {
                        trick_id: *trick_id,
                        winner_id: *winner,
                        winner_name: room.player_name(*winner),
                        scores: *scores,
                    },
                );
            }

            GameEvent::RoundFinished {
                round_number,
                winner,
                scores,
                kot,
                next_dealer,
            } => {
                state.broadcast_to_room(
                    room,
                    ServerMessage::RoundResult {
                        round_number: *round_number,
                        round_winner: *winner,
                        scores: *scores,
                        kot: *kot,
                        next_dealer_id: *next_dealer,
                    },
                );
            }

            GameEvent::PlayerDisconnected { player } => {
                state.broadcast_to_room(
                    room,
                    ServerMessage::PlayerDisconnected { player_id: *player },
                );
            }

            GameEvent::PlayerReconnected { player, name } => {
                state.broadcast_to_room(
                    room,
                    ServerMessage::PlayerReconnected {
                        player_id: *player,
                        player_name: name.clone(),
                    },
                );
            }
        }
    }

    if turn_moved {
        announce_turn(state, room);
    }
}

/// Tell the table whose turn it is; only that seat gets its legal cards.
fn announce_turn(state: &ServerState, room: &GameRoom) {
    let Some(current) = room.game.current_turn() else {
        return;
    };
    state.send_per_seat(room, |seat| {
        let playable_cards = if seat == current {
            room.game.playable_cards(seat)
        } else {
            Vec::new()
        };
        Some(ServerMessage::TurnChanged {
            current_player_id: current,
            playable_cards,
        })
    });
}

/// Re-issue the pending prompt after a seat is reclaimed mid-round.
fn prompt_current_seat(state: &ServerState, room: &GameRoom) {
    let Some(round) = room.game.current_round.as_ref() else {
        return;
    };
    match round.phase {
        RoundPhase::MasterSelection => {
            if let Some(conn) = room.connection_of(round.master_caller_id) {
                state.send_to_player(conn, ServerMessage::PromptMasterSuit);
            }
        }
        RoundPhase::Playing => announce_turn(state, room),
        RoundPhase::Dealing | RoundPhase::Finished => {}
    }
}
