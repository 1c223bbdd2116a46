pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod user;
    pub mod water;
}

pub mod repositories {
    pub mod memory;
    pub mod postgres;
    pub mod user;
    pub mod water;
    pub mod whitelist;
}

pub mod services {
    pub mod auth;
    pub mod users;
    pub mod water;
}

pub mod handlers {
    pub mod auth;
    pub mod users;
    pub mod water;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod user;
    pub mod water;
}
