/// WebSocket Actor Events
///
/// Module này định nghĩa các messages được trao đổi giữa các actors
/// trong relay (giữa Session actors và RelayServer actor).
use actix::prelude::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::message::{GameEvent, ServerMessage};

/// Event: Connection mới được accept
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    /// Unique connection ID
    pub id: Uuid,
    /// Nơi nhận các message relay gửi tới connection này
    pub recipient: Recipient<ServerMessage>,
}

/// Event: Connection đóng (idempotent)
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    /// Connection ID cần deregister
    pub id: Uuid,
}

/// Event: Relay sự kiện game tới mọi connection khác trong cùng domain
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct Relay {
    /// Connection phát sự kiện, không bao giờ nhận lại chính sự kiện này
    pub origin: Uuid,
    pub event: GameEvent,
}

/// Event: Connection tham gia session. Trả về số thành viên sau khi join.
#[derive(Message)]
#[rtype(result = "usize")]
pub struct JoinSession {
    pub id: Uuid,
    pub session_id: String,
}

/// Event: Connection rời session. Trả về session vừa rời (nếu có).
#[derive(Message)]
#[rtype(result = "Option<String>")]
pub struct LeaveSession {
    pub id: Uuid,
}

/// Thông tin tóm tắt của một session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub members: usize,
}

/// Event: Lấy danh sách session, sắp xếp theo session_id
#[derive(Message)]
#[rtype(result = "Vec<SessionSummary>")]
pub struct ListSessions;

/// Event: Lấy thông tin một session
#[derive(Message)]
#[rtype(result = "Option<SessionSummary>")]
pub struct GetSession {
    pub session_id: String,
}

/// Số liệu hiện tại của relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStats {
    pub connections: usize,
    pub sessions: usize,
    /// Số connection đang ở domain mặc định
    pub unjoined: usize,
    pub started_at: DateTime<Utc>,
}

/// Event: Lấy số liệu relay
#[derive(Message)]
#[rtype(result = "RelayStats")]
pub struct GetStats;

/// Event: Socket đã đóng, yêu cầu session actor dừng (và deregister)
#[derive(Message)]
#[rtype(result = "()")]
pub struct Close;
