//! Game room management.
//!
//! A room owns one `GameState` and knows which connection sits in which seat.

use dahalmahra_core::{GameAction, GameError, GameEvent, GameState, PlayerId, NUM_PLAYERS};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::PlayerInfo;

const ROOM_CODE_LEN: usize = 4;
const ROOM_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room not found.")]
    RoomNotFound,

    #[error("Room is full.")]
    RoomFull,

    #[error("Already seated in this room")]
    AlreadySeated,

    #[error("Player not in room")]
    PlayerNotInRoom,

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Generate a short uppercase room code
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_CHARS[rng.gen_range(0..ROOM_CODE_CHARS.len())] as char)
        .collect()
}

/// Result of taking a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    pub seat: PlayerId,
    /// The seat belonged to someone who disconnected
    pub reconnected: bool,
}

/// A game room of up to four seats.
pub struct GameRoom {
    pub id: String,
    pub game: GameState,
    /// Connection currently behind each seat, indexed by seat
    seats: Vec<Option<Uuid>>,
}

impl GameRoom {
    pub fn new(id: String) -> Self {
        Self {
            game: GameState::new(id.clone()),
            id,
            seats: Vec::with_capacity(NUM_PLAYERS),
        }
    }

    /// Reclaim a disconnected seat if there is one, otherwise take the next
    /// new seat.
    pub fn join(&mut self, connection_id: Uuid, name: String) -> Result<JoinOutcome, RoomError> {
        if self.seat_of(connection_id).is_some() {
            return Err(RoomError::AlreadySeated);
        }

        if let Some(seat) = self.game.first_open_seat() {
            self.game.reconnect_player(seat, name)?;
            self.seats[seat as usize] = Some(connection_id);
            return Ok(JoinOutcome {
                seat,
                reconnected: true,
            });
        }

        let seat = self.game.add_player(name).map_err(|e| match e {
            GameError::GameFull => RoomError::RoomFull,
            other => RoomError::Game(other),
        })?;
        self.seats.push(Some(connection_id));
        Ok(JoinOutcome {
            seat,
            reconnected: false,
        })
    }

    /// Vacate a connection's seat. The seat itself stays in the game.
    pub fn leave(&mut self, connection_id: Uuid) -> Result<(PlayerId, Vec<GameEvent>), RoomError> {
        let seat = self
            .seat_of(connection_id)
            .ok_or(RoomError::PlayerNotInRoom)?;
        let events = self.game.remove_player(seat)?;
        self.seats[seat as usize] = None;
        Ok((seat, events))
    }

    /// No seat has anyone behind it
    pub fn is_abandoned(&self) -> bool {
        self.game.connected_count() == 0
    }

    pub fn seat_of(&self, connection_id: Uuid) -> Option<PlayerId> {
        self.seats
            .iter()
            .position(|s| *s == Some(connection_id))
            .map(|idx| idx as PlayerId)
    }

    pub fn connection_of(&self, seat: PlayerId) -> Option<Uuid> {
        self.seats.get(seat as usize).copied().flatten()
    }

    /// Connections of every occupied seat, with their seat
    pub fn occupied_seats(&self) -> Vec<(PlayerId, Uuid)> {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| s.map(|conn| (idx as PlayerId, conn)))
            .collect()
    }

    pub fn player_name(&self, seat: PlayerId) -> String {
        self.game
            .get_player(seat)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Player {}", seat))
    }

    /// All four seats are connected and the first round has not been dealt
    pub fn ready_to_start(&self) -> bool {
        self.game.all_connected() && !self.game.has_teams()
    }

    /// Form teams and deal the first round
    pub fn start_game(&mut self) -> Result<Vec<GameEvent>, RoomError> {
        let mut events = self.game.set_up_teams()?;
        events.extend(self.game.start_new_round()?);
        Ok(events)
    }

    /// A finished round is waiting for the next deal and every seat is back
    pub fn ready_for_next_round(&self) -> bool {
        self.game.has_teams() && self.game.current_round.is_none() && self.game.all_connected()
    }

    pub fn start_next_round(&mut self) -> Result<Vec<GameEvent>, RoomError> {
        Ok(self.game.start_new_round()?)
    }

    /// Apply an in-round action for the seat behind a connection
    pub fn apply_action(
        &mut self,
        connection_id: Uuid,
        action: GameAction,
    ) -> Result<(PlayerId, Vec<GameEvent>), RoomError> {
        let seat = self
            .seat_of(connection_id)
            .ok_or(RoomError::PlayerNotInRoom)?;
        let events = self.game.apply_action(seat, action)?;
        Ok((seat, events))
    }

    pub fn players_info(&self) -> Vec<PlayerInfo> {
        self.game.players.iter().map(PlayerInfo::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dahalmahra_core::{Bot, BotDifficulty};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full_room() -> (GameRoom, Vec<Uuid>) {
        let mut room = GameRoom::new("ABCD".to_string());
        let conns: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        for (i, conn) in conns.iter().enumerate() {
            room.join(*conn, format!("P{}", i)).unwrap();
        }
        (room, conns)
    }

    #[test]
    fn test_room_code_format() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let code = generate_room_code(&mut rng);
            assert_eq!(code.len(), 4);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_seats_in_join_order() {
        let (room, conns) = full_room();
        for (i, conn) in conns.iter().enumerate() {
            assert_eq!(room.seat_of(*conn), Some(i as PlayerId));
            assert_eq!(room.connection_of(i as PlayerId), Some(*conn));
        }
        assert!(room.ready_to_start());
    }

    #[test]
    fn test_fifth_player_rejected() {
        let (mut room, _) = full_room();
        let result = room.join(Uuid::new_v4(), "Late".to_string());
        assert!(matches!(result, Err(RoomError::RoomFull)));
    }

    #[test]
    fn test_same_connection_cannot_take_two_seats() {
        let mut room = GameRoom::new("ABCD".to_string());
        let conn = Uuid::new_v4();
        room.join(conn, "A".to_string()).unwrap();
        assert!(matches!(
            room.join(conn, "A".to_string()),
            Err(RoomError::AlreadySeated)
        ));
    }

    #[test]
    fn test_start_game_deals_first_round() {
        let (mut room, _) = full_room();
        let events = room.start_game().unwrap();

        assert_eq!(events.len(), 2);
        assert!(room.game.current_round.is_some());
        assert!(!room.ready_to_start());
        assert!(!room.ready_for_next_round());
    }

    #[test]
    fn test_leave_keeps_other_seats() {
        let (mut room, conns) = full_room();
        room.start_game().unwrap();

        let (seat, _) = room.leave(conns[1]).unwrap();
        assert_eq!(seat, 1);
        assert_eq!(room.seat_of(conns[2]), Some(2));
        assert_eq!(room.seat_of(conns[3]), Some(3));
        assert_eq!(room.connection_of(1), None);
        assert!(!room.is_abandoned());

        // A newcomer takes the open seat
        let newcomer = Uuid::new_v4();
        let outcome = room.join(newcomer, "New".to_string()).unwrap();
        assert_eq!(
            outcome,
            JoinOutcome {
                seat: 1,
                reconnected: true
            }
        );
        assert_eq!(room.player_name(1), "New");
    }

    #[test]
    fn test_room_abandoned_when_everyone_leaves() {
        let (mut room, conns) = full_room();
        for conn in &conns {
            room.leave(*conn).unwrap();
        }
        assert!(room.is_abandoned());
        assert!(matches!(
            room.leave(conns[0]),
            Err(RoomError::PlayerNotInRoom)
        ));
    }

    #[test]
    fn test_action_from_wrong_seat() {
        let (mut room, conns) = full_room();
        room.start_game().unwrap();

        let caller = room.game.current_round.as_ref().unwrap().master_caller_id;
        let other = conns[((caller + 1) % 4) as usize];
        let result = room.apply_action(
            other,
            GameAction::ChooseMasterSuit(dahalmahra_core::Suit::Clubs),
        );
        assert!(matches!(
            result,
            Err(RoomError::Game(GameError::NotMasterCaller))
        ));

        let (seat, events) = room
            .apply_action(
                conns[caller as usize],
                GameAction::ChooseMasterSuit(dahalmahra_core::Suit::Clubs),
            )
            .unwrap();
        assert_eq!(seat, caller);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_next_round_waits_for_every_seat() {
        let (mut room, conns) = full_room();
        room.start_game().unwrap();

        let mut bots: Vec<Bot> = (0..4)
            .map(|seat| Bot::with_seed(seat, BotDifficulty::Easy, 40 + seat as u64))
            .collect();
        let mut steps = 0;
        while room.game.current_round.is_some() {
            for (seat, bot) in bots.iter_mut().enumerate() {
                if let Some(action) = bot.choose_action(&room.game) {
                    room.apply_action(conns[seat], action).unwrap();
                }
            }
            steps += 1;
            assert!(steps < 500, "round never finished");
        }
        assert_eq!(room.game.past_rounds.len(), 1);
        let next_dealer = room.game.next_dealer_id().unwrap();
        assert!(room.ready_for_next_round());

        room.leave(conns[2]).unwrap();
        assert!(!room.ready_for_next_round());

        let outcome = room.join(Uuid::new_v4(), "Stand-in".to_string()).unwrap();
        assert_eq!(
            outcome,
            JoinOutcome {
                seat: 2,
                reconnected: true
            }
        );
        assert!(room.ready_for_next_round());

        let events = room.start_next_round().unwrap();
        match events.as_slice() {
            [GameEvent::RoundStarted {
                round_number,
                dealer,
                ..
            }] => {
                assert_eq!(*round_number, 2);
                assert_eq!(*dealer, next_dealer);
            }
            other => panic!("unexpected events {:?}", other),
        }
        assert!(!room.ready_for_next_round());
    }
}
