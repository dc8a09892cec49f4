use std::collections::HashMap;

use system::{ConnectionId, RoomId};

/// Room-scoped delivery groups, the transport-level multicast primitive.
/// The code-editing and chat features address one shared namespace keyed
/// by room id, matching the single underlying channel both ride on.
/// Group membership is independent of registry state: a group can exist
/// for a room id no registry knows about, and vice versa.
pub struct MulticastGroups {
    groups: HashMap<RoomId, Vec<ConnectionId>>,
}

impl MulticastGroups {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    /// Joining twice is a no-op.
    pub fn join(&mut self, room_id: &RoomId, connection_id: ConnectionId) {
        let members = self
            .groups
            .entry(room_id.clone())
            .or_insert_with(Vec::new);
        if !members.contains(&connection_id) {
            members.push(connection_id);
        }
    }

    pub fn leave(&mut self, room_id: &RoomId, connection_id: &ConnectionId) {
        if let Some(members) = self.groups.get_mut(room_id) {
            members.retain(|m| m != connection_id);
            if members.is_empty() {
                self.groups.remove(room_id);
            }
        }
    }

    /// Disconnect cleanup: drops the connection from every group.
    pub fn leave_all(&mut self, connection_id: &ConnectionId) {
        self.groups.retain(|_, members| {
            members.retain(|m| m != connection_id);
            !members.is_empty()
        });
    }

    /// Current members in join order. Empty for unknown room ids, so a
    /// broadcast to a group nobody joined is a no-op.
    pub fn members(&self, room_id: &RoomId) -> &[ConnectionId] {
        self.groups
            .get(room_id)
            .map(|members| members.as_slice())
            .unwrap_or(&[])
    }
}
