pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod protocol;
pub mod reconnect;
pub mod session;

#[cfg(test)]
mod tests;

pub use controller::{
    ConnectionStatus, Controller, ControllerHandle, StatusUpdate, spawn_controller,
    spawn_controller_with,
};

pub const LISTENER_APP_NAME: &str = "bitfocus-listener";
pub const LISTENER_DEFAULT_HOST: &str = "127.0.0.1";
pub const LISTENER_DEFAULT_PORT: u16 = 12001;
pub const LISTENER_WS_SCHEME: &str = "ws";
pub const LISTENER_WS_PATH: &str = "/ws";
pub const LISTENER_WS_URL_PREFIX: &str = const_format::concatcp!(LISTENER_WS_SCHEME, "://");
