//! 送信ハンドルの抽象
//!
//! ハンドルは「特定の 1 クライアントへメッセージを push する能力」です。
//! 具体的な実装（チャンネル、WebSocket など）は Infrastructure 層が提供します。

use std::sync::Arc;

use super::{ChatMessage, DeliveryError};

/// 1 クライアントへの送信ハンドル
///
/// `try_send` はブロックしてはいけません。ブロードキャストは全ハンドルへ順に
/// `try_send` を呼ぶため、1 つの遅いクライアントが全体を止めることになります。
#[cfg_attr(test, mockall::automock)]
pub trait OutboundHandle: Send + Sync {
    /// メッセージを push する
    ///
    /// # Errors
    ///
    /// 相手側の接続が終了している場合は `DeliveryError::Disconnected`、
    /// 送信待ちが上限に達している場合は `DeliveryError::Backlogged`
    fn try_send(&self, message: ChatMessage) -> Result<(), DeliveryError>;
}

/// Registry やタスク間で共有される送信ハンドル
pub type SharedHandle = Arc<dyn OutboundHandle>;
