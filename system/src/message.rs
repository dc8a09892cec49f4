use serde::{Deserialize, Serialize};

use crate::{ChatMessage, ConnectionId, CursorPos, Participant, RoomId};

/// Inbound wire messages. Every frame is `{"event": ..., "data": ...}`
/// with a kebab-case event name and camelCase payload fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId, user_name: String },
    #[serde(rename_all = "camelCase")]
    CodeChange { room_id: RoomId, code: String },
    #[serde(rename_all = "camelCase")]
    LanguageChange { room_id: RoomId, language: String },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: RoomId },
    #[serde(rename_all = "camelCase")]
    TypingStart { room_id: RoomId, user_name: String },
    #[serde(rename_all = "camelCase")]
    TypingStop { room_id: RoomId, user_name: String },
    #[serde(rename_all = "camelCase")]
    CodeExecution { room_id: RoomId, output: String },
    #[serde(rename_all = "camelCase")]
    CursorPosition {
        room_id: RoomId,
        user_name: String,
        position: CursorPos,
        from: Option<CursorPos>,
    },
    #[serde(rename_all = "camelCase")]
    JoinChat { room_id: RoomId },
    SendMessage(ChatMessage),
    #[serde(rename_all = "camelCase")]
    LeaveChat { room_id: RoomId },
}

/// Outbound wire messages, same framing as [`ClientCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent once right after the connection is registered, so the client
    /// knows the identity the server will attach to its cursor events.
    #[serde(rename_all = "camelCase")]
    Connected { connection_id: ConnectionId },
    #[serde(rename_all = "camelCase")]
    RoomState {
        code: String,
        language: String,
        users: Vec<Participant>,
    },
    UserJoined(Participant),
    CodeUpdate(String),
    LanguageUpdate(String),
    UserLeft(Participant),
    #[serde(rename_all = "camelCase")]
    UserTyping { user_name: String, is_typing: bool },
    OutputUpdate(String),
    #[serde(rename_all = "camelCase")]
    UserCursorMove {
        user_name: String,
        position: CursorPos,
        from: Option<CursorPos>,
        connection_id: ConnectionId,
    },
    ChatHistory(Vec<ChatMessage>),
    ChatMessage(ChatMessage),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_decodes_join_room() {
        let frame = r#"{"event":"join-room","data":{"roomId":"r1","userName":"Alice"}}"#;
        let command: ClientCommand = serde_json::from_str(frame).unwrap();
        assert_eq!(
            command,
            ClientCommand::JoinRoom {
                room_id: "r1".into(),
                user_name: "Alice".into(),
            }
        );
    }

    #[test]
    fn it_decodes_send_message() {
        let frame = r#"{
            "event": "send-message",
            "data": {
                "id": "m1",
                "message": "hi",
                "sender": "Alice",
                "senderId": 7,
                "timestamp": "2021-05-01T12:00:00Z",
                "roomId": "r1"
            }
        }"#;
        let command: ClientCommand = serde_json::from_str(frame).unwrap();
        match command {
            ClientCommand::SendMessage(message) => {
                assert_eq!(message.sender_id, 7);
                assert_eq!(message.room_id, "r1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn it_encodes_code_update_with_bare_payload() {
        let event = ServerEvent::CodeUpdate("x = 1".into());
        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(encoded, json!({ "event": "code-update", "data": "x = 1" }));
    }

    #[test]
    fn it_encodes_user_typing() {
        let event = ServerEvent::UserTyping {
            user_name: "Bob".into(),
            is_typing: true,
        };
        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(
            encoded,
            json!({
                "event": "user-typing",
                "data": { "userName": "Bob", "isTyping": true }
            })
        );
    }

    #[test]
    fn it_rejects_unknown_events() {
        let frame = r#"{"event":"drop-tables","data":{}}"#;
        assert!(serde_json::from_str::<ClientCommand>(frame).is_err());
    }
}
