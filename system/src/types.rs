use serde::{Deserialize, Serialize};

pub type ConnectionId = u32;
pub type RoomId = String;

/// A connection's membership record within a code-editing room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ConnectionId,
    pub name: String,
}

/// Editor cursor location in line/character coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPos {
    pub line: u64,
    pub ch: u64,
}

/// One stored chat entry. `id` and `timestamp` are opaque client-supplied
/// strings; the server relays them without interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub message: String,
    pub sender: String,
    pub sender_id: ConnectionId,
    pub timestamp: String,
    pub room_id: RoomId,
}
