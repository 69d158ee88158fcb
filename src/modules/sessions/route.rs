use crate::modules::sessions::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_stats).service(scope("/sessions").service(list_sessions).service(get_session));
}
