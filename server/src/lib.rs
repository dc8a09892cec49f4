mod chat_registry;
pub mod connection;
mod connection_tx_storage;
mod multicast;
mod room_registry;
pub mod server;
