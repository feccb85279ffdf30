//! Value objects.

use std::fmt;

use uuid::Uuid;

use super::ClientIdError;

/// クライアント識別子
///
/// クライアントが指定する不透明な文字列。空文字列（空白のみ）以外は全て有効です。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    /// 新しい ClientId を作成
    ///
    /// # Errors
    ///
    /// 空文字列（空白のみを含む）の場合は `ClientIdError::Empty`
    pub fn new(value: String) -> Result<Self, ClientIdError> {
        if value.trim().is_empty() {
            return Err(ClientIdError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ClientIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// セッション識別子
///
/// 1 回の join（登録）ごとにサーバーが発行します。同じ ClientId で再 join した場合も
/// 新しい SessionId になるため、古いセッションの後始末が新しいセッションを消すことはありません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// 新しい SessionId を発行
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
