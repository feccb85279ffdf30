//! Entities.

/// ブロードキャストの単位となるチャットメッセージ
///
/// 全フィールドは送信者が指定した値のまま扱います。
/// `client_id` と `username` は検証されず、`timestamp`（Unix 秒）もサーバーで付け直しません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// 送信者のクライアント ID
    pub client_id: String,
    /// 表示名
    pub username: String,
    /// 本文
    pub content: String,
    /// 送信時刻（Unix 秒）
    pub timestamp: i64,
}

/// 送信リクエストへの応答
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgment {
    /// ブロードキャストが試行されたかどうか
    pub success: bool,
}

impl Acknowledgment {
    pub fn attempted() -> Self {
        Self { success: true }
    }
}
