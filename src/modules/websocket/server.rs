/// Relay Server Actor
///
/// Server actor sở hữu toàn bộ state dùng chung của relay: registry các
/// connection đang sống và index session -> thành viên. Mọi thao tác
/// (connect, disconnect, join, leave, relay) đi qua mailbox của actor nên
/// được xử lý tuần tự, một disconnect không thể chen vào giữa một lần fanout.
///
/// Broadcast domain:
/// - Connection đã join session `S` chỉ trao đổi sự kiện với thành viên khác của `S`
/// - Connection chưa join session nào thuộc domain mặc định, gồm mọi connection
///   khác cũng chưa join (tương đương broadcast toàn process)
use actix::prelude::*;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;

/// Một connection trong registry
struct Connection {
    recipient: Recipient<ServerMessage>,
    session: Option<String>,
}

/// Relay server quản lý tất cả connections và sessions
pub struct RelayServer {
    /// Map: connection_id -> connection
    connections: HashMap<Uuid, Connection>,

    /// Map: session_id -> set of connection_ids
    /// BTreeMap để danh sách session luôn có thứ tự ổn định
    sessions: BTreeMap<String, BTreeSet<Uuid>>,

    started_at: DateTime<Utc>,
}

impl RelayServer {
    /// Tạo relay server mới với state rỗng
    pub fn new() -> Self {
        Self { connections: HashMap::new(), sessions: BTreeMap::new(), started_at: Utc::now() }
    }

    /// Gỡ connection khỏi session hiện tại, xoá session nếu rỗng.
    /// Trả về session vừa rời.
    fn detach(&mut self, id: &Uuid) -> Option<String> {
        let session_id = self.connections.get_mut(id)?.session.take()?;

        if let Some(members) = self.sessions.get_mut(&session_id) {
            members.remove(id);
            if members.is_empty() {
                self.sessions.remove(&session_id);
                tracing::debug!("Session {} empty, removed", session_id);
            }
        }

        Some(session_id)
    }

    /// Snapshot các recipient cùng domain với `origin`, trừ chính `origin`
    fn fanout_targets(&self, origin: &Uuid) -> Vec<(Uuid, Recipient<ServerMessage>)> {
        let Some(origin_conn) = self.connections.get(origin) else {
            return Vec::new();
        };

        match &origin_conn.session {
            Some(session_id) => self
                .sessions
                .get(session_id)
                .into_iter()
                .flatten()
                .filter(|id| *id != origin)
                .filter_map(|id| self.connections.get(id).map(|c| (*id, c.recipient.clone())))
                .collect(),
            None => self
                .connections
                .iter()
                .filter(|(id, conn)| *id != origin && conn.session.is_none())
                .map(|(id, conn)| (*id, conn.recipient.clone()))
                .collect(),
        }
    }

    fn stats(&self) -> RelayStats {
        RelayStats {
            connections: self.connections.len(),
            sessions: self.sessions.len(),
            unjoined: self.connections.values().filter(|c| c.session.is_none()).count(),
            started_at: self.started_at,
        }
    }
}

impl Actor for RelayServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Relay server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Relay server stopped");
    }
}

/// Handler: Connection mới
impl Handler<Connect> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        // Đăng ký trùng id: thay handle cũ, connection quay về domain mặc định
        if self.connections.contains_key(&msg.id) {
            tracing::warn!("Connection {} registered twice, replacing previous handle", msg.id);
            self.detach(&msg.id);
        }

        self.connections.insert(msg.id, Connection { recipient: msg.recipient, session: None });

        tracing::debug!(
            "Connection {} registered ({} connections)",
            msg.id,
            self.connections.len()
        );
    }
}

/// Handler: Connection đóng
impl Handler<Disconnect> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        let left = self.detach(&msg.id);

        if self.connections.remove(&msg.id).is_some() {
            tracing::debug!(
                "Connection {} deregistered (session: {:?}, {} connections remaining)",
                msg.id,
                left,
                self.connections.len()
            );
        } else {
            tracing::debug!("Disconnect for unknown connection {}, ignored", msg.id);
        }
    }
}

/// Handler: Relay sự kiện game
impl Handler<Relay> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: Relay, _: &mut Context<Self>) {
        let targets = self.fanout_targets(&msg.origin);
        let mut sent_count = 0;

        for (target_id, recipient) in targets {
            // Target đang đóng: bỏ qua, Disconnect của nó sẽ tới sau
            if !recipient.connected() {
                tracing::debug!("Dropping {} for closing connection {}", msg.event.name(), target_id);
                continue;
            }

            recipient.do_send(ServerMessage::Event(msg.event.clone()));
            sent_count += 1;
        }

        tracing::debug!(
            "Relayed {} from {}: sent to {} connections",
            msg.event.name(),
            msg.origin,
            sent_count
        );
    }
}

/// Handler: Join session
impl Handler<JoinSession> for RelayServer {
    type Result = usize;

    fn handle(&mut self, msg: JoinSession, _: &mut Context<Self>) -> Self::Result {
        let Some(current) = self.connections.get(&msg.id) else {
            tracing::debug!("Join from unknown connection {}, ignored", msg.id);
            return 0;
        };

        if current.session.as_deref() != Some(msg.session_id.as_str()) {
            self.detach(&msg.id);
            self.sessions.entry(msg.session_id.clone()).or_default().insert(msg.id);
            if let Some(conn) = self.connections.get_mut(&msg.id) {
                conn.session = Some(msg.session_id.clone());
            }
        }

        let members = self.sessions.get(&msg.session_id).map_or(0, BTreeSet::len);

        tracing::info!(
            "Connection {} joined session {} ({} members)",
            msg.id,
            msg.session_id,
            members
        );

        members
    }
}

/// Handler: Leave session
impl Handler<LeaveSession> for RelayServer {
    type Result = MessageResult<LeaveSession>;

    fn handle(&mut self, msg: LeaveSession, _: &mut Context<Self>) -> Self::Result {
        let left = self.detach(&msg.id);

        if let Some(session_id) = &left {
            tracing::info!("Connection {} left session {}", msg.id, session_id);
        }

        MessageResult(left)
    }
}

/// Handler: Danh sách session
impl Handler<ListSessions> for RelayServer {
    type Result = MessageResult<ListSessions>;

    fn handle(&mut self, _: ListSessions, _: &mut Context<Self>) -> Self::Result {
        MessageResult(
            self.sessions
                .iter()
                .map(|(session_id, members)| SessionSummary {
                    session_id: session_id.clone(),
                    members: members.len(),
                })
                .collect(),
        )
    }
}

/// Handler: Thông tin một session
impl Handler<GetSession> for RelayServer {
    type Result = MessageResult<GetSession>;

    fn handle(&mut self, msg: GetSession, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.sessions.get(&msg.session_id).map(|members| SessionSummary {
            session_id: msg.session_id.clone(),
            members: members.len(),
        }))
    }
}

/// Handler: Số liệu relay
impl Handler<GetStats> for RelayServer {
    type Result = MessageResult<GetStats>;

    fn handle(&mut self, _: GetStats, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.stats())
    }
}

/// Implement Message trait cho ServerMessage để có thể send tới sessions
impl Message for ServerMessage {
    type Result = ();
}

impl Default for RelayServer {
    fn default() -> Self {
        Self::new()
    }
}
