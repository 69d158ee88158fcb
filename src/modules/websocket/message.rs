/// WebSocket Message Protocol
///
/// Module này định nghĩa các frame JSON trao đổi giữa client và relay,
/// cùng với bộ từ vựng sự kiện game (`GameEvent`) được relay chuyển tiếp.
///
/// Payload của sự kiện là opaque: relay không đọc, không kiểm tra, chỉ
/// chuyển nguyên cấu trúc (kể cả thứ tự key của object) tới các client khác.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Sự kiện game được relay chuyển tiếp.
///
/// Trên wire có dạng `{"event": "<tên>", "args": [...]}`. Số lượng tham số
/// được chuẩn hoá theo từng sự kiện: thiếu thì điền `null`, thừa thì bỏ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub enum GameEvent {
    /// `update-players`: snapshot danh sách người chơi
    UpdatePlayers(Value),
    /// `start-game`: trạng thái bàn cờ ban đầu, thông tin phụ
    StartGame(Value, Value),
    /// `next-turn`: người chơi của lượt tiếp theo
    NextTurn(Value),
    /// `message`: tin nhắn chat
    Message(Value),
    /// `settlement`: dữ liệu đặt settlement
    Settlement(Value),
    /// `road`: dữ liệu đặt road
    Road(Value),
    /// `hide-color`: màu người chơi cần ẩn
    HideColor(Value),
    /// `dice-roll`: xúc xắc thứ nhất, xúc xắc thứ hai
    DiceRoll(Value, Value),
    /// `host-quit`: không có tham số
    HostQuit,
}

impl GameEvent {
    #[cfg(test)]
    pub const NAMES: [&'static str; 9] = [
        "update-players",
        "start-game",
        "next-turn",
        "message",
        "settlement",
        "road",
        "hide-color",
        "dice-roll",
        "host-quit",
    ];

    /// Tên sự kiện trên wire
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::UpdatePlayers(_) => "update-players",
            GameEvent::StartGame(..) => "start-game",
            GameEvent::NextTurn(_) => "next-turn",
            GameEvent::Message(_) => "message",
            GameEvent::Settlement(_) => "settlement",
            GameEvent::Road(_) => "road",
            GameEvent::HideColor(_) => "hide-color",
            GameEvent::DiceRoll(..) => "dice-roll",
            GameEvent::HostQuit => "host-quit",
        }
    }

    pub fn into_args(self) -> Vec<Value> {
        match self {
            GameEvent::UpdatePlayers(v)
            | GameEvent::NextTurn(v)
            | GameEvent::Message(v)
            | GameEvent::Settlement(v)
            | GameEvent::Road(v)
            | GameEvent::HideColor(v) => vec![v],
            GameEvent::StartGame(a, b) | GameEvent::DiceRoll(a, b) => vec![a, b],
            GameEvent::HostQuit => Vec::new(),
        }
    }
}

/// Dạng thô của sự kiện trên wire, trước khi đối chiếu với bộ từ vựng
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub event: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EventError {
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
}

impl TryFrom<RawEvent> for GameEvent {
    type Error = EventError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let mut args = raw.args.into_iter();
        let mut next = move || args.next().unwrap_or(Value::Null);

        match raw.event.as_str() {
            "update-players" => Ok(GameEvent::UpdatePlayers(next())),
            "start-game" => {
                let board = next();
                let info = next();
                Ok(GameEvent::StartGame(board, info))
            }
            "next-turn" => Ok(GameEvent::NextTurn(next())),
            "message" => Ok(GameEvent::Message(next())),
            "settlement" => Ok(GameEvent::Settlement(next())),
            "road" => Ok(GameEvent::Road(next())),
            "hide-color" => Ok(GameEvent::HideColor(next())),
            "dice-roll" => {
                let first = next();
                let second = next();
                Ok(GameEvent::DiceRoll(first, second))
            }
            "host-quit" => Ok(GameEvent::HostQuit),
            other => Err(EventError::UnknownEvent(other.to_owned())),
        }
    }
}

impl From<GameEvent> for RawEvent {
    fn from(event: GameEvent) -> Self {
        RawEvent { event: event.name().to_string(), args: event.into_args() }
    }
}

/// Payload của frame joinSession
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[validate(length(min = 1, max = 64))]
    pub session_id: String,
}

/// Messages được gửi từ client đến relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Phát một sự kiện game tới các client khác cùng session
    Emit(GameEvent),

    /// Tham gia session (rời session cũ nếu có)
    JoinSession(JoinRequest),

    /// Rời session, quay về domain mặc định
    LeaveSession,

    /// Ping để kiểm tra connection
    Ping,
}

/// Messages được gửi từ relay đến client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Gửi một lần ngay sau khi kết nối
    #[serde(rename_all = "camelCase")]
    Welcome { connection_id: Uuid },

    /// Sự kiện được relay từ một client khác
    Event(GameEvent),

    /// Đã tham gia session
    #[serde(rename_all = "camelCase")]
    Joined { session_id: String, members: usize },

    /// Đã rời session (None nếu trước đó không ở session nào)
    #[serde(rename_all = "camelCase")]
    Left { session_id: Option<String> },

    /// Pong response cho Ping
    Pong,

    /// Lỗi xảy ra
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === GameEvent ===

    #[test]
    fn test_event_names_are_kebab_case() {
        let events = [
            GameEvent::UpdatePlayers(json!([])),
            GameEvent::StartGame(json!({}), json!(null)),
            GameEvent::NextTurn(json!("p2")),
            GameEvent::Message(json!("hi")),
            GameEvent::Settlement(json!({})),
            GameEvent::Road(json!({})),
            GameEvent::HideColor(json!("red")),
            GameEvent::DiceRoll(json!(1), json!(6)),
            GameEvent::HostQuit,
        ];
        let names: Vec<&str> = events.iter().map(GameEvent::name).collect();
        assert_eq!(names, GameEvent::NAMES);
    }

    #[test]
    fn test_dice_roll_deserialize() {
        let json = r#"{"event":"dice-roll","args":[3,5]}"#;
        let event: GameEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, GameEvent::DiceRoll(json!(3), json!(5)));
    }

    #[test]
    fn test_dice_roll_serialize() {
        let event = GameEvent::DiceRoll(json!(3), json!(5));
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"dice-roll","args":[3,5]}"#);
    }

    #[test]
    fn test_host_quit_without_args() {
        let event: GameEvent = serde_json::from_str(r#"{"event":"host-quit"}"#).unwrap();
        assert_eq!(event, GameEvent::HostQuit);
        assert_eq!(serde_json::to_string(&event).unwrap(), r#"{"event":"host-quit","args":[]}"#);
    }

    #[test]
    fn test_missing_args_become_null() {
        let event: GameEvent =
            serde_json::from_str(r#"{"event":"start-game","args":[{"tiles":[]}]}"#).unwrap();
        assert_eq!(event, GameEvent::StartGame(json!({"tiles": []}), Value::Null));
    }

    #[test]
    fn test_surplus_args_are_dropped() {
        let event: GameEvent =
            serde_json::from_str(r#"{"event":"road","args":[{"edge":4},"extra",7]}"#).unwrap();
        assert_eq!(event, GameEvent::Road(json!({"edge": 4})));
    }

    #[test]
    fn test_unknown_event_returns_error() {
        let raw = RawEvent { event: "steal-card".to_string(), args: vec![] };
        assert_eq!(
            GameEvent::try_from(raw),
            Err(EventError::UnknownEvent("steal-card".to_string()))
        );

        let result = serde_json::from_str::<GameEvent>(r#"{"event":"steal-card","args":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_key_order_preserved() {
        let json = r#"{"event":"update-players","args":[{"zeta":1,"alpha":{"y":2,"b":3}}]}"#;
        let event: GameEvent = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&event).unwrap(), json);
    }

    // === ClientMessage ===

    #[test]
    fn test_client_emit_deserialize() {
        let json = r#"{"type":"emit","event":"message","args":["hello"]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Emit(GameEvent::Message(v)) if v == "hello"));
    }

    #[test]
    fn test_client_emit_unknown_event_fails() {
        let json = r#"{"type":"emit","event":"trade","args":[]}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_client_join_session_deserialize() {
        let json = r#"{"type":"joinSession","sessionId":"game-42"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::JoinSession(j) if j.session_id == "game-42"));
    }

    #[test]
    fn test_client_leave_and_ping_deserialize() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"leaveSession"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::LeaveSession));
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_invalid_type_returns_error() {
        let json = r#"{"type":"unknownType"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_join_session_validation() {
        assert!(JoinRequest { session_id: "lobby".into() }.validate().is_ok());
        assert!(JoinRequest { session_id: String::new() }.validate().is_err());
        assert!(JoinRequest { session_id: "x".repeat(65) }.validate().is_err());
    }

    // === ServerMessage ===

    #[test]
    fn test_server_event_serialize() {
        let msg = ServerMessage::Event(GameEvent::DiceRoll(json!(3), json!(5)));
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"event","event":"dice-roll","args":[3,5]}"#);
    }

    #[test]
    fn test_server_welcome_serialize() {
        let id = Uuid::now_v7();
        let json = serde_json::to_string(&ServerMessage::Welcome { connection_id: id }).unwrap();
        assert!(json.contains("\"type\":\"welcome\""));
        assert!(json.contains(&format!("\"connectionId\":\"{id}\"")));
    }

    #[test]
    fn test_server_joined_and_left_serialize() {
        let joined = ServerMessage::Joined { session_id: "g1".into(), members: 3 };
        assert_eq!(
            serde_json::to_string(&joined).unwrap(),
            r#"{"type":"joined","sessionId":"g1","members":3}"#
        );
        let left = ServerMessage::Left { session_id: None };
        assert_eq!(serde_json::to_string(&left).unwrap(), r#"{"type":"left","sessionId":null}"#);
    }

    #[test]
    fn test_server_pong_serialize() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_server_event_parses_back() {
        let json = r#"{"type":"event","event":"next-turn","args":["blue"]}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, ServerMessage::Event(GameEvent::NextTurn(json!("blue"))));
    }
}
