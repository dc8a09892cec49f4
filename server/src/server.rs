use std::num::Wrapping;

use tokio::sync::mpsc::{channel, Sender};

use system::{ChatMessage, ClientCommand, ConnectionId, CursorPos, Participant, RoomId, ServerEvent};

use crate::chat_registry::ChatRegistry;
use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;
use crate::multicast::MulticastGroups;
use crate::room_registry::RoomRegistry;

pub type ServerTx = Sender<ConnectionCommand>;

/// Coordinates every room, chat, and group mutation from a single task.
/// Commands are processed to completion one at a time, which is what
/// makes each handler atomic without any locking.
struct Server {
    connection_id_source: Wrapping<ConnectionId>,
    rooms: RoomRegistry,
    chats: ChatRegistry,
    groups: MulticastGroups,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            rooms: RoomRegistry::new(),
            chats: ChatRegistry::new(),
            groups: MulticastGroups::new(),
            connections: ConnectionTxStorage::new(),
        }
    }

    async fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let connection_id = self.new_connection_id();
                self.connections.insert(connection_id, tx);
                self.connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                    .await;
                log::info!("Connection {} established", connection_id);
            }
            ConnectionCommand::Disconnect { from } => {
                if self.connections.remove(&from).is_none() {
                    // already cleaned up
                    return;
                }
                self.groups.leave_all(&from);
                for (room_id, participant) in self.rooms.remove_from_all(&from) {
                    log::info!(
                        "User {} left room {} on disconnect",
                        participant.name,
                        room_id
                    );
                    self.broadcast(&room_id, ServerEvent::UserLeft(participant), None)
                        .await;
                }
                log::info!("Connection {} disconnected", from);
            }
            ConnectionCommand::ClientCommand { from, command } => {
                self.handle_client_command(from, command).await;
            }
        }
    }

    async fn handle_client_command(&mut self, from: ConnectionId, command: ClientCommand) {
        match command {
            ClientCommand::JoinRoom { room_id, user_name } => {
                self.join_room(from, room_id, user_name).await
            }
            ClientCommand::CodeChange { room_id, code } => {
                self.code_change(from, room_id, code).await
            }
            ClientCommand::LanguageChange { room_id, language } => {
                self.language_change(from, room_id, language).await
            }
            ClientCommand::LeaveRoom { room_id } => self.leave_room(from, room_id).await,
            ClientCommand::TypingStart { room_id, user_name } => {
                self.typing(from, room_id, user_name, true).await
            }
            ClientCommand::TypingStop { room_id, user_name } => {
                self.typing(from, room_id, user_name, false).await
            }
            ClientCommand::CodeExecution { room_id, output } => {
                self.code_execution(room_id, output).await
            }
            ClientCommand::CursorPosition {
                room_id,
                user_name,
                position,
                from: prior,
            } => {
                self.cursor_position(from, room_id, user_name, position, prior)
                    .await
            }
            ClientCommand::JoinChat { room_id } => self.join_chat(from, room_id).await,
            ClientCommand::SendMessage(message) => self.send_message(message).await,
            ClientCommand::LeaveChat { room_id } => self.leave_chat(from, room_id).await,
        }
    }

    async fn join_room(&mut self, from: ConnectionId, room_id: RoomId, user_name: String) {
        self.groups.join(&room_id, from);

        let participant = Participant {
            id: from,
            name: user_name,
        };
        let newly_joined = self.rooms.join(&room_id, participant.clone());

        let state = {
            let room = self.rooms.get(&room_id).expect("room was just created");
            ServerEvent::RoomState {
                code: room.document.clone(),
                language: room.language.clone(),
                users: room.members.clone(),
            }
        };
        self.connections
            .send(&from, ConnectionEvent::Event(state))
            .await;

        if newly_joined {
            log::info!("User {} joined room {}", participant.name, room_id);
            self.broadcast(&room_id, ServerEvent::UserJoined(participant), Some(&from))
                .await;
        }
    }

    async fn code_change(&mut self, from: ConnectionId, room_id: RoomId, code: String) {
        match self.rooms.set_document(&room_id, code.clone()) {
            Ok(()) => {
                self.broadcast(&room_id, ServerEvent::CodeUpdate(code), Some(&from))
                    .await
            }
            Err(e) => log::debug!("Ignoring code-change from {} for {}: {}", from, room_id, e),
        }
    }

    async fn language_change(&mut self, from: ConnectionId, room_id: RoomId, language: String) {
        match self.rooms.set_language(&room_id, language.clone()) {
            Ok(()) => {
                self.broadcast(&room_id, ServerEvent::LanguageUpdate(language), Some(&from))
                    .await
            }
            Err(e) => log::debug!(
                "Ignoring language-change from {} for {}: {}",
                from,
                room_id,
                e
            ),
        }
    }

    async fn leave_room(&mut self, from: ConnectionId, room_id: RoomId) {
        // Leave the group first so the departing connection is not among
        // the broadcast recipients.
        self.groups.leave(&room_id, &from);
        if let Some(participant) = self.rooms.remove(&room_id, &from) {
            log::info!("User {} left room {}", participant.name, room_id);
            self.broadcast(&room_id, ServerEvent::UserLeft(participant), None)
                .await;
        }
    }

    async fn typing(
        &mut self,
        from: ConnectionId,
        room_id: RoomId,
        user_name: String,
        is_typing: bool,
    ) {
        self.broadcast(
            &room_id,
            ServerEvent::UserTyping {
                user_name,
                is_typing,
            },
            Some(&from),
        )
        .await;
    }

    async fn code_execution(&mut self, room_id: RoomId, output: String) {
        // The requester sees the result too, unlike every other relay.
        self.broadcast(&room_id, ServerEvent::OutputUpdate(output), None)
            .await;
    }

    async fn cursor_position(
        &mut self,
        from: ConnectionId,
        room_id: RoomId,
        user_name: String,
        position: CursorPos,
        prior: Option<CursorPos>,
    ) {
        self.broadcast(
            &room_id,
            ServerEvent::UserCursorMove {
                user_name,
                position,
                from: prior,
                connection_id: from,
            },
            Some(&from),
        )
        .await;
    }

    async fn join_chat(&mut self, from: ConnectionId, room_id: RoomId) {
        self.groups.join(&room_id, from);
        self.chats.ensure_room(&room_id);
        let history = self.chats.history(&room_id);
        self.connections
            .send(&from, ConnectionEvent::Event(ServerEvent::ChatHistory(history)))
            .await;
        log::info!("Connection {} joined chat room {}", from, room_id);
    }

    async fn send_message(&mut self, message: ChatMessage) {
        let room_id = message.room_id.clone();
        if let Err(e) = self.chats.append(message.clone()) {
            log::debug!("Message to {} not stored: {}", room_id, e);
        }
        // Delivery does not depend on storage: a message sent before any
        // join-chat still reaches whoever is currently in the group.
        self.broadcast(&room_id, ServerEvent::ChatMessage(message), None)
            .await;
    }

    async fn leave_chat(&mut self, from: ConnectionId, room_id: RoomId) {
        self.groups.leave(&room_id, &from);
        log::info!("Connection {} left chat room {}", from, room_id);
    }

    async fn broadcast(
        &mut self,
        room_id: &RoomId,
        event: ServerEvent,
        without: Option<&ConnectionId>,
    ) {
        for connection_id in self.groups.members(room_id) {
            if without.map_or(true, |w| w != connection_id) {
                self.connections
                    .send(connection_id, ConnectionEvent::Event(event.clone()))
                    .await;
            }
        }
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        self.connection_id_source += Wrapping(1);
        self.connection_id_source.0
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ConnectionCommand>(16);

    tokio::spawn(async move {
        let mut server = Box::new(Server::new());

        while let Some(command) = srv_rx.recv().await {
            server.handle_connection_command(command).await;
        }
    });

    srv_tx
}
