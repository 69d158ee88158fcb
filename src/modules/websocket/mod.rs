/// WebSocket Module
///
/// Module này cung cấp event relay cho board game thông qua WebSocket protocol.
/// Nó bao gồm:
///
/// - Message protocol (ClientMessage, ServerMessage & GameEvent)
/// - Relay Server actor (quản lý connections, sessions và fanout)
/// - WebSocket Session actor (xử lý từng connection)
/// - HTTP handler (upgrade HTTP thành WebSocket, heartbeat)
pub mod events;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;
