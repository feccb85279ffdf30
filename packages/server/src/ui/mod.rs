//! UI 層（axum による HTTP / WebSocket サーバー）

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, ServerError};
pub use state::SessionTimeouts;
