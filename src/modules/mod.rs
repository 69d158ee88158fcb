pub mod sessions {
    pub mod handle;
    pub mod model;
    pub mod route;
}

pub mod websocket;
