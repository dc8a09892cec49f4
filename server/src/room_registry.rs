use std::collections::HashMap;

use system::{ConnectionId, Participant, RoomId};

pub const DEFAULT_DOCUMENT: &str = "// Start coding...\nconsole.log(\"Hello World!\");";
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Internal-only failure kind for mutations addressed at an unknown room.
/// Never surfaced to clients; the dispatcher drops the mutation and logs.
#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    RoomNotFound,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RegistryError::RoomNotFound => write!(f, "room not found"),
        }
    }
}

pub struct Room {
    pub id: RoomId,
    pub document: String,
    pub language: String,
    pub members: Vec<Participant>,
}

impl Room {
    fn new(id: RoomId) -> Self {
        Self {
            id,
            document: DEFAULT_DOCUMENT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            members: Vec::new(),
        }
    }
}

/// Owns every live code-editing room. A room exists exactly while it has
/// at least one member: it is created on the first join to an unknown id
/// and dropped the moment its member list becomes empty.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Adds the participant to the room, creating the room with default
    /// content when the id is unknown. Returns `true` for a genuinely new
    /// member; a repeated join from the same connection only refreshes the
    /// stored display name, so the members list never holds duplicates.
    pub fn join(&mut self, room_id: &RoomId, participant: Participant) -> bool {
        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone()));
        if let Some(existing) = room.members.iter_mut().find(|m| m.id == participant.id) {
            existing.name = participant.name;
            false
        } else {
            room.members.push(participant);
            true
        }
    }

    /// Replaces the room's document in full. Last write wins; there is no
    /// version check, so a reordered update can overwrite a newer one.
    pub fn set_document(&mut self, room_id: &RoomId, code: String) -> Result<(), RegistryError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or(RegistryError::RoomNotFound)?;
        room.document = code;
        Ok(())
    }

    pub fn set_language(
        &mut self,
        room_id: &RoomId,
        language: String,
    ) -> Result<(), RegistryError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or(RegistryError::RoomNotFound)?;
        room.language = language;
        Ok(())
    }

    /// Removes the connection's participant from the room, dropping the
    /// room entirely when its last member leaves. `None` when the room is
    /// unknown or the connection was not a member.
    pub fn remove(
        &mut self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<Participant> {
        let room = self.rooms.get_mut(room_id)?;
        let index = room.members.iter().position(|m| &m.id == connection_id)?;
        let participant = room.members.remove(index);
        if room.members.is_empty() {
            self.rooms.remove(room_id);
        }
        Some(participant)
    }

    /// Disconnect cleanup: removes the connection from every room it is a
    /// member of. Scans all rooms rather than assuming a single membership.
    pub fn remove_from_all(&mut self, connection_id: &ConnectionId) -> Vec<(RoomId, Participant)> {
        let room_ids: Vec<RoomId> = self.rooms.keys().cloned().collect();
        let mut removed = Vec::new();
        for room_id in room_ids {
            if let Some(participant) = self.remove(&room_id, connection_id) {
                removed.push((room_id, participant));
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: ConnectionId, name: &str) -> Participant {
        Participant {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn it_seeds_new_rooms_with_defaults() {
        let mut registry = RoomRegistry::new();
        assert!(registry.join(&"r1".to_string(), participant(1, "Alice")));

        let room = registry.get(&"r1".to_string()).unwrap();
        assert_eq!(room.id, "r1");
        assert_eq!(room.document, DEFAULT_DOCUMENT);
        assert_eq!(room.language, DEFAULT_LANGUAGE);
        assert_eq!(room.members, vec![participant(1, "Alice")]);
    }

    #[test]
    fn it_keeps_content_when_another_connection_joins() {
        let mut registry = RoomRegistry::new();
        let room_id = "r1".to_string();
        registry.join(&room_id, participant(1, "Alice"));
        registry.set_document(&room_id, "x = 1".to_string()).unwrap();
        registry.set_language(&room_id, "python".to_string()).unwrap();

        registry.join(&room_id, participant(2, "Bob"));

        let room = registry.get(&room_id).unwrap();
        assert_eq!(room.document, "x = 1");
        assert_eq!(room.language, "python");
        assert_eq!(room.members.len(), 2);
    }

    #[test]
    fn it_never_duplicates_a_member() {
        let mut registry = RoomRegistry::new();
        let room_id = "r1".to_string();
        assert!(registry.join(&room_id, participant(1, "Alice")));
        assert!(!registry.join(&room_id, participant(1, "Alicia")));

        let room = registry.get(&room_id).unwrap();
        assert_eq!(room.members, vec![participant(1, "Alicia")]);
    }

    #[test]
    fn it_drops_the_room_when_the_last_member_leaves() {
        let mut registry = RoomRegistry::new();
        let room_id = "r1".to_string();
        registry.join(&room_id, participant(1, "Alice"));
        registry.join(&room_id, participant(2, "Bob"));

        assert_eq!(registry.remove(&room_id, &1), Some(participant(1, "Alice")));
        assert!(registry.contains(&room_id));

        assert_eq!(registry.remove(&room_id, &2), Some(participant(2, "Bob")));
        assert!(!registry.contains(&room_id));
    }

    #[test]
    fn it_recreates_a_destroyed_room_with_fresh_defaults() {
        let mut registry = RoomRegistry::new();
        let room_id = "r1".to_string();
        registry.join(&room_id, participant(1, "Alice"));
        registry.set_document(&room_id, "x = 1".to_string()).unwrap();
        registry.remove(&room_id, &1);

        registry.join(&room_id, participant(2, "Bob"));
        assert_eq!(registry.get(&room_id).unwrap().document, DEFAULT_DOCUMENT);
    }

    #[test]
    fn it_rejects_mutations_on_unknown_rooms() {
        let mut registry = RoomRegistry::new();
        assert_eq!(
            registry.set_document(&"nope".to_string(), "x".to_string()),
            Err(RegistryError::RoomNotFound)
        );
        assert_eq!(
            registry.set_language(&"nope".to_string(), "go".to_string()),
            Err(RegistryError::RoomNotFound)
        );
        assert_eq!(registry.remove(&"nope".to_string(), &1), None);
    }

    #[test]
    fn it_removes_a_connection_from_every_room() {
        let mut registry = RoomRegistry::new();
        registry.join(&"r1".to_string(), participant(1, "Alice"));
        registry.join(&"r1".to_string(), participant(2, "Bob"));
        registry.join(&"r2".to_string(), participant(1, "Alice"));

        let mut removed = registry.remove_from_all(&1);
        removed.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            removed,
            vec![
                ("r1".to_string(), participant(1, "Alice")),
                ("r2".to_string(), participant(1, "Alice")),
            ]
        );
        assert!(registry.contains(&"r1".to_string()));
        assert!(!registry.contains(&"r2".to_string()));
    }
}
