//! WebSocket connection handlers (JoinChat).

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatMessage, ClientId},
    infrastructure::{
        ChannelHandle, SessionGuard,
        dto::{ChatMessageDto, JoinQuery},
    },
    ui::state::{AppState, SessionTimeouts},
    usecase::JoinError,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<JoinQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let client_id = match ClientId::try_from(query.client_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejecting join: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // Create a channel for this client to receive broadcasts
    let (handle, rx) = ChannelHandle::channel();

    // Register before upgrading so that a duplicate join can still be answered with 409
    let session = match state
        .join_chat_usecase
        .register(client_id.clone(), Arc::new(handle))
    {
        Ok(session) => session,
        Err(JoinError::AlreadyJoined(_)) => {
            tracing::warn!(
                "Client with ID '{}' is already connected. Rejecting connection.",
                client_id
            );
            return Err(StatusCode::CONFLICT);
        }
    };

    // If the upgrade never completes, the closure (and the session guard) is dropped
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, session, rx)))
}

/// Upper bound on sending the Close frame during shutdown
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Spawns a task that receives broadcasts from the rx channel and pushes them to the WebSocket sender.
///
/// Also sends a Ping every `ping_interval`. Ends when the channel closes, when a write
/// fails or exceeds `write_timeout` (peer gone or not reading), or on server shutdown
/// (after trying to send a Close frame).
fn pusher_loop(
    mut rx: mpsc::Receiver<ChatMessage>,
    mut sender: SplitSink<WebSocket, Message>,
    client_id: ClientId,
    shutdown: CancellationToken,
    timeouts: SessionTimeouts,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ping = time::interval_at(
            Instant::now() + timeouts.ping_interval,
            timeouts.ping_interval,
        );
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let frame = tokio::select! {
                message = rx.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    match serde_json::to_string(&ChatMessageDto::from(message)) {
                        Ok(json) => Message::Text(json.into()),
                        Err(e) => {
                            tracing::error!("Failed to serialize message for '{}': {}", client_id, e);
                            continue;
                        }
                    }
                }
                _ = ping.tick() => Message::Ping(Default::default()),
                _ = shutdown.cancelled() => {
                    tracing::debug!("Closing connection of '{}' for shutdown", client_id);
                    let _ = time::timeout(CLOSE_TIMEOUT, sender.send(Message::Close(None))).await;
                    break;
                }
            };

            // A pending write never outlives shutdown
            tokio::select! {
                result = time::timeout(timeouts.write_timeout, sender.send(frame)) => match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!("Failed to write to '{}': {}", client_id, e);
                        break;
                    }
                    Err(_) => {
                        tracing::warn!(
                            "Write to '{}' did not complete within {:?}. Ending session",
                            client_id,
                            timeouts.write_timeout
                        );
                        break;
                    }
                },
                _ = shutdown.cancelled() => {
                    tracing::debug!("Dropping connection of '{}' for shutdown with a pending write", client_id);
                    break;
                }
            }
        }
    })
}

/// Spawns a task that watches the inbound half of the WebSocket.
///
/// Messages are sent through the HTTP endpoint, so inbound frames carry no chat
/// content; this task only detects the end of the connection. Any inbound frame,
/// Pong included, counts as activity; silence for `idle_timeout` ends the session.
fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    client_id: ClientId,
    idle_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let msg = match time::timeout(idle_timeout, receiver.next()).await {
                Ok(Some(msg)) => msg,
                Ok(None) => break,
                Err(_) => {
                    tracing::info!(
                        "Client '{}' sent nothing for {:?}. Ending session",
                        client_id,
                        idle_timeout
                    );
                    break;
                }
            };
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Client '{}' requested close", client_id);
                    break;
                }
                Ok(Message::Text(text)) => {
                    tracing::debug!("Ignoring inbound text from '{}': {}", client_id, text.as_str());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("WebSocket error from '{}': {}", client_id, e);
                    break;
                }
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session: SessionGuard,
    rx: mpsc::Receiver<ChatMessage>,
) {
    let client_id = session.client_id().clone();
    let (sender, receiver) = socket.split();

    let timeouts = state.session_timeouts;
    let send_task = pusher_loop(
        rx,
        sender,
        client_id.clone(),
        state.shutdown.clone(),
        timeouts,
    );
    let recv_task = reader_loop(receiver, client_id, timeouts.idle_timeout);

    // If any one of the tasks completes, abort the other
    let session_end = async move {
        let (mut send_task, mut recv_task) = (send_task, recv_task);
        tokio::select! {
            _ = &mut recv_task => send_task.abort(),
            _ = &mut send_task => recv_task.abort(),
        };
    };

    state
        .join_chat_usecase
        .hold_until(session, session_end)
        .await;
}
