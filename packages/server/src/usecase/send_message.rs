//! UseCase: メッセージ送信処理
//!
//! 送信されたメッセージを Broadcast Dispatcher に渡し、ACK を返します。
//! 個々の受信者への配信失敗は送信者には見せず、ログに記録するだけです。

use std::sync::Arc;

use crate::domain::{Acknowledgment, ChatMessage};

use super::broadcast::{BroadcastDispatcher, DispatchResult};

/// メッセージ送信の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// 送信者へ返す ACK
    pub acknowledgment: Acknowledgment,
    /// 受信者ごとの配信結果
    pub dispatch: DispatchResult,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    dispatcher: Arc<BroadcastDispatcher>,
}

impl SendMessageUseCase {
    pub fn new(dispatcher: Arc<BroadcastDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `message` - 送信されたメッセージ（Domain Model）。内容は検証しない
    ///
    /// # Returns
    ///
    /// ブロードキャストを試行した時点で `success: true` の ACK と、受信者ごとの配信結果
    pub fn execute(&self, message: ChatMessage) -> SendOutcome {
        tracing::info!(
            "Broadcasting message from '{}' ({}): {}",
            message.client_id,
            message.username,
            message.content
        );

        let dispatch = self.dispatcher.broadcast(&message);

        if dispatch.is_complete() {
            tracing::debug!("Message delivered to {} client(s)", dispatch.delivered());
        } else {
            tracing::warn!(
                "Message delivered to {}/{} client(s); failed sessions were removed",
                dispatch.delivered(),
                dispatch.recipients()
            );
        }

        SendOutcome {
            acknowledgment: Acknowledgment::attempted(),
            dispatch,
        }
    }
}
