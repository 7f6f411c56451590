//! Relay pairing
//!
//! Bookkeeping for the relay server: players are seated two to a room,
//! first free seat wins. The lobby decides who hears what; the server binary
//! only moves the resulting [`Delivery`] values onto sockets.

use std::collections::{BTreeMap, HashMap};

use crate::net::SyncEvent;

pub type PlayerId = u64;
pub type RoomId = u64;

/// A frame the server must write to one player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: PlayerId,
    pub text: String,
}

const ROOM_CAPACITY: usize = 2;

#[derive(Debug, Default)]
struct Room {
    players: Vec<PlayerId>,
}

#[derive(Debug, Default)]
pub struct Lobby {
    /// Ordered so the oldest room with a free seat fills first
    rooms: BTreeMap<RoomId, Room>,
    seats: HashMap<PlayerId, RoomId>,
    next_room: RoomId,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn room_of(&self, player: PlayerId) -> Option<RoomId> {
        self.seats.get(&player).copied()
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let room = self.rooms.get(&self.room_of(player)?)?;
        room.players.iter().copied().find(|&p| p != player)
    }

    /// Seat `player`. When that fills the room, both occupants are told.
    pub fn join(&mut self, player: PlayerId) -> Vec<Delivery> {
        if self.seats.contains_key(&player) {
            log::warn!("Player {} already seated", player);
            return Vec::new();
        }

        let room_id = match self
            .rooms
            .iter()
            .find(|(_, room)| room.players.len() < ROOM_CAPACITY)
        {
            Some((&id, _)) => id,
            None => {
                self.next_room += 1;
                self.rooms.insert(self.next_room, Room::default());
                self.next_room
            }
        };

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Vec::new();
        };
        room.players.push(player);
        self.seats.insert(player, room_id);
        log::info!("Player {} joined room {}", player, room_id);

        if room.players.len() < ROOM_CAPACITY {
            return Vec::new();
        }
        log::info!("Room {} paired: {:?}", room_id, room.players);
        let recipients = room.players.clone();
        signal(&SyncEvent::OpponentConnected, recipients)
    }

    /// Free `player`'s seat and tell whoever is left behind
    pub fn leave(&mut self, player: PlayerId) -> Vec<Delivery> {
        let Some(room_id) = self.seats.remove(&player) else {
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Vec::new();
        };
        room.players.retain(|&p| p != player);
        log::info!("Player {} left room {}", player, room_id);

        if room.players.is_empty() {
            self.rooms.remove(&room_id);
            return Vec::new();
        }
        let recipients = room.players.clone();
        signal(&SyncEvent::OpponentDisconnected, recipients)
    }

    /// Forward a frame from `from` to its opponent, verbatim.
    ///
    /// Pairing signals are the lobby's to send; a client claiming one is
    /// dropped. Anything else goes through untouched, malformed or not.
    pub fn route(&self, from: PlayerId, text: &str) -> Option<Delivery> {
        if SyncEvent::decode(text).is_ok_and(|event| event.is_lifecycle()) {
            log::warn!("Player {} sent a pairing signal, dropping", from);
            return None;
        }
        let to = self.opponent_of(from)?;
        Some(Delivery {
            to,
            text: text.to_owned(),
        })
    }
}

fn signal(event: &SyncEvent, recipients: Vec<PlayerId>) -> Vec<Delivery> {
    match event.encode() {
        Ok(text) => recipients
            .into_iter()
            .map(|to| Delivery {
                to,
                text: text.clone(),
            })
            .collect(),
        Err(e) => {
            log::error!("Failed to encode {}: {}", event.kind(), e);
            Vec::new()
        }
    }
}
