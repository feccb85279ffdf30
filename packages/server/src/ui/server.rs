//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use hiroba_shared::protocol::{CLIENTS_PATH, HEALTH_PATH, JOIN_PATH, SEND_PATH};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::ConnectionRegistry,
    usecase::{BroadcastDispatcher, JoinChatUseCase, ListClientsUseCase, SendMessageUseCase},
};

use super::{
    handler::{health_check, list_clients, send_message, websocket_handler},
    signal::shutdown_signal,
    state::{AppState, SessionTimeouts},
};

/// Error returned by the server entry points
pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// Broadcast relay server
///
/// This struct encapsulates the use cases and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(join_chat_usecase, send_message_usecase, list_clients_usecase);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// JoinChatUseCase（チャット参加のユースケース）
    join_chat_usecase: Arc<JoinChatUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// ListClientsUseCase（接続中クライアント一覧のユースケース）
    list_clients_usecase: Arc<ListClientsUseCase>,
    /// セッションの死活監視の設定
    session_timeouts: SessionTimeouts,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        join_chat_usecase: Arc<JoinChatUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        list_clients_usecase: Arc<ListClientsUseCase>,
    ) -> Self {
        Self {
            join_chat_usecase,
            send_message_usecase,
            list_clients_usecase,
            session_timeouts: SessionTimeouts::default(),
        }
    }

    /// Override the ping, idle and write limits of joined sessions
    pub fn with_session_timeouts(mut self, session_timeouts: SessionTimeouts) -> Self {
        self.session_timeouts = session_timeouts;
        self
    }

    /// Create a server whose use cases all share `registry`
    pub fn from_registry(registry: ConnectionRegistry) -> Self {
        let dispatcher = Arc::new(BroadcastDispatcher::new(registry.clone()));
        Self::new(
            Arc::new(JoinChatUseCase::new(registry.clone())),
            Arc::new(SendMessageUseCase::new(dispatcher)),
            Arc::new(ListClientsUseCase::new(registry)),
        )
    }

    /// Build the router with all endpoints
    fn router(self, shutdown: CancellationToken) -> Router {
        let app_state = Arc::new(AppState {
            join_chat_usecase: self.join_chat_usecase,
            send_message_usecase: self.send_message_usecase,
            list_clients_usecase: self.list_clients_usecase,
            shutdown,
            session_timeouts: self.session_timeouts,
        });

        Router::new()
            // WebSocket エンドポイント（JoinChat）
            .route(JOIN_PATH, get(websocket_handler))
            // HTTP エンドポイント
            .route(SEND_PATH, post(send_message))
            .route(HEALTH_PATH, get(health_check))
            .route(CLIENTS_PATH, get(list_clients))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the relay server until Ctrl+C or SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Join:  ws://{}{}?client_id=<id>", bind_addr, JOIN_PATH);
        tracing::info!("Send:  POST http://{}{}", bind_addr, SEND_PATH);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let shutdown = CancellationToken::new();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            signal_token.cancel();
        });

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` is cancelled
    ///
    /// Cancelling the token also ends every joined session, which removes them from the registry.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        let app = self.router(shutdown.clone());

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled_owned().await })
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
