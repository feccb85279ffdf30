//! Request handlers.

pub mod http;
pub mod websocket;

pub use http::{health_check, list_clients, send_message};
pub use websocket::websocket_handler;
