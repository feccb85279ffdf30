//! Server state shared by the handlers.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::usecase::{JoinChatUseCase, ListClientsUseCase, SendMessageUseCase};

/// Liveness limits applied to every joined WebSocket session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Interval between Ping frames sent to the peer
    pub ping_interval: Duration,
    /// The session ends when nothing (not even a Pong) arrives for this long
    pub idle_timeout: Duration,
    /// The session ends when a single write does not complete within this long
    pub write_timeout: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// JoinChatUseCase（チャット参加のユースケース）
    pub join_chat_usecase: Arc<JoinChatUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// ListClientsUseCase（接続中クライアント一覧のユースケース）
    pub list_clients_usecase: Arc<ListClientsUseCase>,
    /// サーバー停止の通知。キャンセルされると全セッションが終了する
    pub shutdown: CancellationToken,
    /// セッションの死活監視の設定
    pub session_timeouts: SessionTimeouts,
}
