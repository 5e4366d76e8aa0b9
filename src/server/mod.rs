//! HTTP and WebSocket front end
//!
//! Viewers connect to `/ws` and receive a JSON color update on connect and
//! on every hub tick. Plain HTTP endpoints expose the latest color and the
//! server status.

pub mod config;
mod handlers;
pub mod listener;

pub use config::ServerConfig;
pub use handlers::{StatsResponse, StatusResponse};
pub use listener::ColorServer;
