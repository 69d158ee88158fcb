use actix::Actor;
use actix_web::{self, middleware::Logger, web, App, HttpServer};

use crate::{
    api::error::SystemError,
    modules::websocket::{handler::websocket_handler, server::RelayServer},
};

mod api;
mod configs;
mod constants;
mod modules;
mod utils;

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Relay is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    configs::init_tracing();

    let env = constants::Env::load().map_err(SystemError::from).map_err(std::io::Error::other)?;
    tracing::info!("Configuration loaded: {:?}", env);

    let relay = RelayServer::new().start();

    let bind_addr = (env.ip.clone(), env.port);
    let workers = env.workers;
    let env = web::Data::new(env);

    tracing::info!("Starting relay at http://{}:{}", bind_addr.0, bind_addr.1);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(relay.clone()))
            .app_data(env.clone())
            .service(health_check)
            .service(
                web::resource("/ws")
                    .wrap(configs::websocket_cors())
                    .route(web::get().to(websocket_handler)),
            )
            .service(
                web::scope("/api")
                    .wrap(configs::api_cors(&env.client_origin))
                    .configure(modules::sessions::route::configure),
            )
    })
    .bind(bind_addr)?
    .workers(workers)
    .run()
    .await
}
