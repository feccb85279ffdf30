//! Domain errors.

use thiserror::Error;

use super::ClientId;

/// ClientId の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientIdError {
    /// 空文字列（空白のみを含む）の ID
    #[error("client_id must not be empty")]
    Empty,
}

/// Registry への登録エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// 同じ ClientId のセッションが既に有効
    #[error("client '{0}' has already joined")]
    AlreadyJoined(ClientId),
}

/// 送信ハンドルへの配信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// 相手側の接続が既に終了している
    #[error("peer has disconnected")]
    Disconnected,
    /// 送信待ちのメッセージが上限に達している（相手側が受信していない）
    #[error("peer is not keeping up with the broadcast")]
    Backlogged,
}
