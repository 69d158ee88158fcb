/// WebSocket HTTP Handler
///
/// Module này xử lý HTTP upgrade request và quản lý bidirectional message flow:
/// - Inbound:  Client → WebSocket → parse ClientMessage → Session Actor
/// - Outbound: Server Actor → Session Actor → mpsc channel → WebSocket → Client
///
/// Heartbeat: server ping mỗi `heartbeat_interval`; nếu không nhận được gì từ
/// client trong `client_timeout` thì đóng connection.
use std::time::Duration;

use actix::{Actor, Addr};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{
    AggregatedMessage, AggregatedMessageStream, CloseCode, CloseReason, Closed, MessageStream,
    ProtocolError, Session,
};
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant};

use crate::constants::Env;

use super::events::Close;
use super::message::ClientMessage;
use super::server::RelayServer;
use super::session::WebSocketSession;

/// Số frame tối đa chờ gửi cho một client trước khi session bị coi là chậm
pub const OUTBOUND_BUFFER: usize = 256;

/// Đầu ghi của socket, tách ra để loop không phụ thuộc vào actix-ws
pub(crate) trait ClientSocket {
    async fn text(&mut self, text: String) -> Result<(), Closed>;
    async fn ping(&mut self) -> Result<(), Closed>;
    async fn pong(&mut self, data: &[u8]) -> Result<(), Closed>;
}

impl ClientSocket for Session {
    async fn text(&mut self, text: String) -> Result<(), Closed> {
        Session::text(self, text).await
    }

    async fn ping(&mut self) -> Result<(), Closed> {
        Session::ping(self, b"").await
    }

    async fn pong(&mut self, data: &[u8]) -> Result<(), Closed> {
        Session::pong(self, data).await
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Timing {
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
}

/// Parse text frame từ client.
/// Frame lỗi hoặc sự kiện lạ: log rồi bỏ qua, không báo lại client
pub(crate) fn decode_client_frame(text: &str) -> Option<ClientMessage> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => Some(msg),
        Err(e) => {
            tracing::warn!(
                "Cannot parse client message: {} - raw: {}",
                e,
                text.chars().take(100).collect::<String>()
            );
            None
        }
    }
}

pub(crate) fn heartbeat_expired(
    last_heartbeat: Instant,
    now: Instant,
    client_timeout: Duration,
) -> bool {
    now.duration_since(last_heartbeat) > client_timeout
}

/// Giới hạn kích thước frame và ghép các continuation frame thành một message
pub(crate) fn client_stream(
    msg_stream: MessageStream,
    max_frame_size: usize,
) -> AggregatedMessageStream {
    msg_stream
        .max_frame_size(max_frame_size)
        .aggregate_continuations()
        .max_continuation_size(max_frame_size)
}

fn policy_close(description: &str) -> Option<CloseReason> {
    Some(CloseReason { code: CloseCode::Policy, description: Some(description.to_string()) })
}

/// Vòng lặp của một connection. Khi kết thúc: gửi `Close` cho session actor
/// và trả về lý do đóng socket.
pub(crate) async fn run_connection<S, W>(
    mut inbound: S,
    outbound: &mut W,
    addr: Addr<WebSocketSession>,
    mut rx: mpsc::Receiver<String>,
    timing: Timing,
) -> Option<CloseReason>
where
    S: Stream<Item = Result<AggregatedMessage, ProtocolError>> + Unpin,
    W: ClientSocket,
{
    let Timing { heartbeat_interval, client_timeout } = timing;
    let mut last_heartbeat = Instant::now();
    let mut heartbeat = interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);

    let close_reason = loop {
        tokio::select! {
            // === INBOUND: Client → Server ===
            msg = inbound.next() => {
                if matches!(msg, Some(Ok(_))) {
                    last_heartbeat = Instant::now();
                }

                match msg {
                    Some(Ok(AggregatedMessage::Text(text))) => {
                        if let Some(client_msg) = decode_client_frame(&text) {
                            addr.do_send(client_msg);
                        }
                    }

                    Some(Ok(AggregatedMessage::Ping(data))) => {
                        // Tự động trả lời pong cho WebSocket-level ping
                        if outbound.pong(&data).await.is_err() {
                            tracing::error!("Cannot send pong");
                            break None;
                        }
                    }

                    Some(Ok(AggregatedMessage::Pong(_))) => {
                        // Heartbeat response
                    }

                    Some(Ok(AggregatedMessage::Close(reason))) => {
                        tracing::info!("WebSocket close frame: {:?}", reason);
                        break reason;
                    }

                    Some(Ok(AggregatedMessage::Binary(_))) => {
                        tracing::warn!("Binary messages are not supported");
                    }

                    Some(Err(e)) => {
                        tracing::error!("WebSocket protocol error: {}", e);
                        break Some(CloseReason {
                            code: CloseCode::Protocol,
                            description: Some(e.to_string()),
                        });
                    }

                    // Stream kết thúc (client disconnect)
                    None => break None,
                }
            }

            // === OUTBOUND: Server → Client ===
            json = rx.recv() => {
                let Some(json) = json else {
                    // Session actor đã dừng
                    break None;
                };
                // Client không đọc nữa thì write bị treo: giới hạn bằng client_timeout
                match timeout(client_timeout, outbound.text(json)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => {
                        tracing::error!("Cannot send message to WebSocket client");
                        break None;
                    }
                    Err(_) => {
                        tracing::info!("Client stopped reading, disconnecting");
                        break policy_close("write timeout");
                    }
                }
            }

            // === HEARTBEAT ===
            _ = heartbeat.tick() => {
                if heartbeat_expired(last_heartbeat, Instant::now(), client_timeout) {
                    tracing::info!("Client heartbeat timed out, disconnecting");
                    break policy_close("heartbeat timeout");
                }

                match timeout(client_timeout, outbound.ping()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => break None,
                    Err(_) => break policy_close("write timeout"),
                }
            }
        }
    };

    // Dừng session actor (deregister khỏi relay)
    addr.do_send(Close);
    tracing::debug!("WebSocket message loop ended");
    close_reason
}

/// HTTP handler để upgrade connection thành WebSocket
///
/// Endpoint: GET /ws
///
/// Flow:
/// 1. HTTP handshake → WebSocket connection
/// 2. Tạo mpsc channel có giới hạn (session actor → client)
/// 3. Start WebSocketSession actor (actor tự đăng ký với RelayServer)
/// 4. Spawn async task chạy `run_connection`, sau đó đóng socket
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<RelayServer>>,
    env: web::Data<Env>,
) -> Result<HttpResponse, Error> {
    tracing::debug!("WebSocket upgrade request from {:?}", req.peer_addr());

    // Thực hiện WebSocket handshake
    let (response, mut ws_session, msg_stream) = actix_ws::handle(&req, stream)?;
    let msg_stream = client_stream(msg_stream, env.max_frame_size);

    let (tx, rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);
    let addr = WebSocketSession::new(server.get_ref().clone(), tx).start();

    let timing =
        Timing { heartbeat_interval: env.heartbeat_interval, client_timeout: env.client_timeout };

    actix_web::rt::spawn(async move {
        let close_reason = run_connection(msg_stream, &mut ws_session, addr, rx, timing).await;
        let _ = ws_session.close(close_reason).await;
    });

    tracing::info!("WebSocket connection established");
    Ok(response)
}
