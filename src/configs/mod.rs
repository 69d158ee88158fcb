use actix_cors::Cors;
use actix_web::http::header;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "game_relay=info,actix_web=info".into()),
        )
        .init();
}

/// CORS cho introspection API: chỉ cho phép frontend
pub fn api_cors(client_origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(client_origin)
        .allowed_methods(vec!["GET"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

/// CORS cho WebSocket upgrade: mọi origin
pub fn websocket_cors() -> Cors {
    Cors::permissive()
}
