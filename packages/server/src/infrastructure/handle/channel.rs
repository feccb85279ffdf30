//! チャンネルを使った OutboundHandle 実装
//!
//! ## 設計ノート
//!
//! ブロードキャストはこのハンドルへの `try_send` までを担当し、
//! ソケットへの書き込みは UI 層のセッションごとの pusher タスクが行います。
//! チャンネルは容量 `OUTBOUND_CAPACITY` の bounded チャンネルで、`try_send` は待機しません。
//! 受信側（pusher タスク）が終了していれば `Disconnected`、
//! 相手側が受信せず送信待ちが溜まっていれば `Backlogged` として失敗します。

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{ChatMessage, DeliveryError, OutboundHandle};

/// 1 セッションあたりの送信待ちメッセージの上限
pub const OUTBOUND_CAPACITY: usize = 256;

/// チャンネルを使った OutboundHandle 実装
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    sender: mpsc::Sender<ChatMessage>,
}

impl ChannelHandle {
    /// 容量 `OUTBOUND_CAPACITY` のハンドルと、それに対応する受信側を作成
    pub fn channel() -> (Self, mpsc::Receiver<ChatMessage>) {
        Self::with_capacity(OUTBOUND_CAPACITY)
    }

    /// 指定した容量のハンドルと、それに対応する受信側を作成
    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<ChatMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// 受信側が既に閉じているかどうか
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl OutboundHandle for ChannelHandle {
    fn try_send(&self, message: ChatMessage) -> Result<(), DeliveryError> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Backlogged,
            TrySendError::Closed(_) => DeliveryError::Disconnected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str) -> ChatMessage {
        ChatMessage {
            client_id: "a1".to_string(),
            username: "alice".to_string(),
            content: content.to_string(),
            timestamp: 1000,
        }
    }

    #[tokio::test]
    async fn test_try_send_delivers_to_receiver() {
        // テスト項目: try_send したメッセージが受信側に届く
        // given (前提条件):
        let (handle, mut rx) = ChannelHandle::channel();

        // when (操作):
        let result = handle.try_send(message("hi"));

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some(message("hi")));
    }

    #[tokio::test]
    async fn test_try_send_preserves_order() {
        // テスト項目: 同じハンドルへの送信は送信順に受信される
        // given (前提条件):
        let (handle, mut rx) = ChannelHandle::channel();

        // when (操作):
        handle.try_send(message("first")).unwrap();
        handle.try_send(message("second")).unwrap();

        // then (期待する結果):
        assert_eq!(rx.recv().await.unwrap().content, "first");
        assert_eq!(rx.recv().await.unwrap().content, "second");
    }

    #[test]
    fn test_try_send_fails_after_receiver_dropped() {
        // テスト項目: 受信側が破棄された後の送信は Disconnected エラーになる
        // given (前提条件):
        let (handle, rx) = ChannelHandle::channel();
        drop(rx);

        // when (操作):
        let result = handle.try_send(message("hi"));

        // then (期待する結果):
        assert!(handle.is_closed());
        assert_eq!(result, Err(DeliveryError::Disconnected));
    }

    #[tokio::test]
    async fn test_try_send_fails_when_backlog_is_full() {
        // テスト項目: 受信側が読み出さず送信待ちが上限に達すると Backlogged エラーになり、待機しない
        // given (前提条件):
        let (handle, mut rx) = ChannelHandle::with_capacity(2);
        handle.try_send(message("1")).unwrap();
        handle.try_send(message("2")).unwrap();

        // when (操作):
        let result = handle.try_send(message("3"));

        // then (期待する結果): 溢れたメッセージは捨てられ、既存の送信待ちは残る
        assert_eq!(result, Err(DeliveryError::Backlogged));
        assert_eq!(rx.recv().await.unwrap().content, "1");
        assert_eq!(rx.recv().await.unwrap().content, "2");
        assert!(rx.try_recv().is_err());
    }
}
