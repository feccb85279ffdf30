//! Chat session: one WebSocket join plus HTTP sends.

use futures_util::{SinkExt, StreamExt};
use hiroba_shared::{
    protocol::{AcknowledgmentDto, ChatMessageDto},
    time::Clock,
};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, protocol::Message},
};

use crate::{
    domain::{ClientConfig, build_outgoing_message},
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Run one chat session until the user exits or the connection is lost.
///
/// Lines received on `input_rx` are sent through the send endpoint. The session
/// ends with `Ok(())` when `input_rx` closes (the user exited).
///
/// # Errors
///
/// * `ClientError::DuplicateClientId` - the server rejected the join with `409 Conflict`
/// * `ClientError::ConnectionError` - the join failed or the connection was lost
pub async fn run_client_session(
    config: &ClientConfig,
    http: &reqwest::Client,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    clock: &dyn Clock,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = match connect_async(config.join_url().as_str()).await {
        Ok(result) => result,
        Err(WsError::Http(response)) if response.status().as_u16() == 409 => {
            return Err(ClientError::DuplicateClientId(config.client_id.clone()));
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to chat server!");
    println!(
        "{}",
        MessageFormatter::format_joined(&config.username, &config.client_id)
    );
    redisplay_prompt(&config.username);

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to print incoming messages
    let username = config.username.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let line = match serde_json::from_str::<ChatMessageDto>(&text) {
                        Ok(chat_msg) => MessageFormatter::format_chat_message(&chat_msg, &username),
                        Err(_) => MessageFormatter::format_raw_message(&text),
                    };
                    print!("\r{}\n", line);
                    redisplay_prompt(&username);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut read_task => {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
            line = input_rx.recv() => {
                let Some(content) = line else {
                    // The user exited
                    read_task.abort();
                    if let Err(e) = write.close().await {
                        tracing::debug!("Failed to close WebSocket: {}", e);
                    }
                    return Ok(());
                };
                let message = build_outgoing_message(config, content, clock);
                if let Err(e) = send_message(http, config, &message).await {
                    tracing::warn!("{}", e);
                    print!("\r{}\n", e);
                    redisplay_prompt(&config.username);
                }
            }
        }
    }
}

/// Send one message through the send endpoint.
///
/// # Errors
///
/// Returns `ClientError::SendFailed` if the request fails or is not acknowledged.
pub async fn send_message(
    http: &reqwest::Client,
    config: &ClientConfig,
    message: &ChatMessageDto,
) -> Result<(), ClientError> {
    let ack: AcknowledgmentDto = http
        .post(config.send_url())
        .json(message)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| ClientError::SendFailed(e.to_string()))?
        .json()
        .await
        .map_err(|e| ClientError::SendFailed(e.to_string()))?;

    if ack.success {
        Ok(())
    } else {
        Err(ClientError::SendFailed(
            "the server did not acknowledge the message".to_string(),
        ))
    }
}
