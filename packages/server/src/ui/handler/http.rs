//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::{AcknowledgmentDto, ChatMessageDto, ClientListDto},
    ui::state::AppState,
};

/// SendMessage: broadcast a message to every joined session
///
/// The acknowledgment only says that the broadcast was attempted; per-recipient
/// failures are not reported to the sender. Malformed bodies are rejected by the
/// `Json` extractor before this handler runs.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(message): Json<ChatMessageDto>,
) -> Json<AcknowledgmentDto> {
    let outcome = state.send_message_usecase.execute(message.into());
    Json(outcome.acknowledgment.into())
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// List joined clients
pub async fn list_clients(State(state): State<Arc<AppState>>) -> Json<ClientListDto> {
    let client_ids: Vec<String> = state
        .list_clients_usecase
        .execute()
        .into_iter()
        .map(|id| id.into_string())
        .collect();

    Json(ClientListDto {
        count: client_ids.len(),
        client_ids,
    })
}
