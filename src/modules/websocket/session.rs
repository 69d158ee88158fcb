/// WebSocket Session Actor
///
/// Mỗi WebSocket connection có một Session actor riêng.
/// Session actor nhận ClientMessage đã parse từ handler.rs, chuyển tiếp tới
/// RelayServer, và gửi các ServerMessage tới client thông qua mpsc channel
/// được bridge từ handler.rs.
///
/// Thứ tự: client -> session -> server -> session khác -> channel -> socket
/// là một chuỗi hàng đợi FIFO, nên sự kiện từ cùng một người gửi luôn tới
/// người nhận đúng thứ tự đã gửi.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;
use validator::Validate;

use crate::api::error::SystemError;

use super::events::*;
use super::message::{ClientMessage, GameEvent, JoinRequest, ServerMessage};
use super::server::RelayServer;

/// WebSocket session cho một client
pub struct WebSocketSession {
    /// Unique connection ID
    pub id: Uuid,

    /// Address của relay server actor
    pub server: Addr<RelayServer>,

    /// Channel có giới hạn gửi JSON messages tới client (bridge → handler.rs → WebSocket)
    pub tx: mpsc::Sender<String>,
}

impl WebSocketSession {
    /// Tạo session mới với outbound channel
    pub fn new(server: Addr<RelayServer>, tx: mpsc::Sender<String>) -> Self {
        Self { id: Uuid::now_v7(), server, tx }
    }

    fn encode(msg: &ServerMessage) -> Result<String, SystemError> {
        Ok(serde_json::to_string(msg)?)
    }

    /// Gửi ServerMessage tới client thông qua channel.
    /// Channel đầy (client không đọc kịp) hoặc đã đóng: dừng actor.
    fn send_to_client(&self, msg: &ServerMessage, ctx: &mut Context<Self>) {
        match Self::encode(msg) {
            Ok(json) => match self.tx.try_send(json) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!("Outbound channel full (connection {}), stopping", self.id);
                    ctx.stop();
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!("Outbound channel closed (connection {}), stopping", self.id);
                    ctx.stop();
                }
            },
            Err(e) => {
                tracing::error!("Cannot serialize ServerMessage (connection {}): {}", self.id, e);
            }
        }
    }

    /// Gửi error message tới client
    fn send_error(&self, message: &str, ctx: &mut Context<Self>) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() }, ctx);
    }

    /// Xử lý message từ client - dispatch tới handler tương ứng
    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        match msg {
            ClientMessage::Emit(event) => {
                self.handle_emit(event);
            }

            ClientMessage::JoinSession(request) => {
                self.handle_join_session(request, ctx);
            }

            ClientMessage::LeaveSession => {
                self.handle_leave_session(ctx);
            }

            ClientMessage::Ping => {
                self.send_to_client(&ServerMessage::Pong, ctx);
            }
        }
    }

    /// Relay sự kiện, fire-and-forget: người gửi không nhận xác nhận
    fn handle_emit(&self, event: GameEvent) {
        tracing::trace!("Connection {} emitted {}", self.id, event.name());
        self.server.do_send(Relay { origin: self.id, event });
    }

    /// Xử lý join session - validate session id rồi báo server
    fn handle_join_session(&self, request: JoinRequest, ctx: &mut Context<Self>) {
        if let Err(e) = request.validate() {
            tracing::warn!("Connection {} sent invalid session id: {}", self.id, e);
            self.send_error("Session id must be 1 to 64 characters", ctx);
            return;
        }

        let session_id = request.session_id;

        ctx.spawn(
            self.server
                .send(JoinSession { id: self.id, session_id: session_id.clone() })
                .into_actor(self)
                .map(move |res, act, ctx| match res {
                    Ok(members) => {
                        act.send_to_client(&ServerMessage::Joined { session_id, members }, ctx);
                    }
                    Err(e) => {
                        tracing::error!("Join failed (connection {}): {}", act.id, e);
                        act.send_error("Cannot join session", ctx);
                    }
                }),
        );
    }

    /// Xử lý leave session
    fn handle_leave_session(&self, ctx: &mut Context<Self>) {
        ctx.spawn(self.server.send(LeaveSession { id: self.id }).into_actor(self).map(
            |res, act, ctx| match res {
                Ok(session_id) => {
                    act.send_to_client(&ServerMessage::Left { session_id }, ctx);
                }
                Err(e) => {
                    tracing::error!("Leave failed (connection {}): {}", act.id, e);
                    act.send_error("Cannot leave session", ctx);
                }
            },
        ));
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {}", self.id);

        // Notify server về connection mới
        self.server.do_send(Connect { id: self.id, recipient: ctx.address().recipient() });

        self.send_to_client(&ServerMessage::Welcome { connection_id: self.id }, ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {}", self.id);

        // Notify server về disconnect
        self.server.do_send(Disconnect { id: self.id });
    }
}

/// Implement Message trait cho ClientMessage để có thể send qua actors
impl Message for ClientMessage {
    type Result = ();
}

/// Handler: Nhận ClientMessage từ handler.rs
impl Handler<ClientMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        self.handle_client_message(msg, ctx);
    }
}

/// Handler: Nhận ServerMessage từ server actor → serialize → gửi tới client qua channel
impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, ctx: &mut Context<Self>) {
        self.send_to_client(&msg, ctx);
    }
}

/// Handler: Socket đã đóng
impl Handler<Close> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, _: Close, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}
