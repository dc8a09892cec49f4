use std::collections::{HashMap, VecDeque};

use system::{ChatMessage, RoomId};

use crate::room_registry::RegistryError;

pub const HISTORY_CAPACITY: usize = 100;

/// Owns every chat room's bounded history. Unlike code-editing rooms,
/// chat rooms are never destroyed once created; only each room's history
/// is bounded. Tests pin this asymmetry so a future change to it is a
/// deliberate one.
pub struct ChatRegistry {
    rooms: HashMap<RoomId, VecDeque<ChatMessage>>,
}

impl ChatRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Creates the room with an empty history when the id is unknown.
    pub fn ensure_room(&mut self, room_id: &RoomId) {
        self.rooms.entry(room_id.clone()).or_default();
    }

    /// History snapshot, oldest first. Empty for unknown rooms.
    pub fn history(&self, room_id: &RoomId) -> Vec<ChatMessage> {
        self.rooms
            .get(room_id)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Appends to an existing room's history, evicting the oldest entry
    /// once the capacity is exceeded. Messages addressed at a room nobody
    /// ever joined are not stored.
    pub fn append(&mut self, message: ChatMessage) -> Result<(), RegistryError> {
        let history = self
            .rooms
            .get_mut(&message.room_id)
            .ok_or(RegistryError::RoomNotFound)?;
        history.push_back(message);
        if history.len() > HISTORY_CAPACITY {
            history.pop_front();
        }
        Ok(())
    }
}
