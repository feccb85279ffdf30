//! Wire protocol shared by the relay server and its clients.
//!
//! | 操作          | トランスポート                                  |
//! |---------------|-------------------------------------------------|
//! | JoinChat      | `GET /ws?client_id=<id>` (WebSocket, server push) |
//! | SendMessage   | `POST /api/messages` (JSON body, JSON ack)       |
//!
//! Every frame pushed over the WebSocket is a JSON encoded [`ChatMessageDto`].

use serde::{Deserialize, Serialize};

/// WebSocket endpoint path
pub const JOIN_PATH: &str = "/ws";
/// Unary send endpoint path
pub const SEND_PATH: &str = "/api/messages";
/// Health check endpoint path
pub const HEALTH_PATH: &str = "/api/health";
/// Joined clients endpoint path
pub const CLIENTS_PATH: &str = "/api/clients";

/// Query parameters for the join (WebSocket) request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinQuery {
    pub client_id: String,
}

/// A chat message as it travels over the wire
///
/// `timestamp` is supplied by the sender (Unix epoch seconds) and is never re-stamped by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub client_id: String,
    pub username: String,
    pub content: String,
    pub timestamp: i64,
}

/// Response of the send endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgmentDto {
    pub success: bool,
}

/// Response of the joined clients endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientListDto {
    pub count: usize,
    pub client_ids: Vec<String>,
}
