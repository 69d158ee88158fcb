use actix::Addr;
use actix_web::{get, web};

use crate::api::error::{self, SystemError};
use crate::api::success;
use crate::modules::sessions::model::{ListSessionsQuery, SessionPage};
use crate::modules::websocket::events::{GetSession, GetStats, ListSessions, RelayStats, SessionSummary};
use crate::modules::websocket::server::RelayServer;
use crate::utils::ValidatedQuery;

#[get("/stats")]
pub async fn get_stats(
    server: web::Data<Addr<RelayServer>>,
) -> Result<success::Success<RelayStats>, error::Error> {
    let stats = server.send(GetStats).await?;
    Ok(success::Success::ok(Some(stats)).message("Relay stats retrieved successfully"))
}

#[get("")]
pub async fn list_sessions(
    server: web::Data<Addr<RelayServer>>,
    query: ValidatedQuery<ListSessionsQuery>,
) -> Result<success::Success<SessionPage>, error::Error> {
    let sessions = server.send(ListSessions).await?;
    let page = SessionPage::paginate(sessions, &query.0);
    Ok(success::Success::ok(Some(page)).message("Sessions retrieved successfully"))
}

#[get("/{session_id}")]
pub async fn get_session(
    server: web::Data<Addr<RelayServer>>,
    session_id: web::Path<String>,
) -> Result<success::Success<SessionSummary>, error::Error> {
    let session_id = session_id.into_inner();
    let session = server
        .send(GetSession { session_id: session_id.clone() })
        .await?
        .ok_or_else(|| SystemError::not_found(format!("Session {session_id} not found")))?;
    Ok(success::Success::ok(Some(session)).message("Session retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::sessions::route;
    use crate::modules::websocket::server::tests::connect;
    use actix::Actor;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    macro_rules! app {
        ($server:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($server.clone()))
                    .service(web::scope("/api").configure(route::configure)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_stats_counts_connections() {
        let server = RelayServer::new().start();
        let a = connect(&server).await;
        let _b = connect(&server).await;
        a.join(&server, "table").await;

        let app = app!(server);
        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["connections"], 2);
        assert_eq!(body["data"]["sessions"], 1);
        assert_eq!(body["data"]["unjoined"], 1);
        assert!(body["data"]["startedAt"].is_string());
        assert_eq!(body["message"], "Relay stats retrieved successfully");
    }

    #[actix_web::test]
    async fn test_list_sessions_sorted_and_paginated() {
        let server = RelayServer::new().start();
        let a = connect(&server).await;
        let b = connect(&server).await;
        let c = connect(&server).await;
        c.join(&server, "zeta").await;
        a.join(&server, "alpha").await;
        b.join(&server, "alpha").await;

        let app = app!(server);
        let req = test::TestRequest::get().uri("/api/sessions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["sessions"][0]["sessionId"], "alpha");
        assert_eq!(body["data"]["sessions"][0]["members"], 2);
        assert_eq!(body["data"]["sessions"][1]["sessionId"], "zeta");

        let req = test::TestRequest::get().uri("/api/sessions?limit=1&offset=1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["sessions"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["data"]["sessions"][0]["sessionId"], "zeta");
    }

    #[actix_web::test]
    async fn test_list_sessions_rejects_bad_limit() {
        let server = RelayServer::new().start();
        let app = app!(server);

        let req = test::TestRequest::get().uri("/api/sessions?limit=0").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/sessions?limit=abc").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_get_session() {
        let server = RelayServer::new().start();
        let a = connect(&server).await;
        a.join(&server, "game-7").await;

        let app = app!(server);
        let req = test::TestRequest::get().uri("/api/sessions/game-7").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["sessionId"], "game-7");
        assert_eq!(body["data"]["members"], 1);

        let req = test::TestRequest::get().uri("/api/sessions/missing").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Session missing not found");
    }
}
