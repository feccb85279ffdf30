//! UseCase: チャットへの参加（セッションの維持）
//!
//! join はセッションを Registry に登録し、トランスポートの接続が終了するまで待機し、
//! 終了したら登録を解除します。メッセージの処理は一切行いません。
//!
//! 接続の終了（相手側の切断・ネットワークエラー・サーバー停止）は `session_end` future の完了で表します。
//! 登録解除は `SessionGuard` の破棄で行うため、この future を待っているタスクが
//! abort された場合も必ず 1 回だけ登録解除されます。

use std::future::Future;

use crate::{
    domain::{ClientId, SharedHandle},
    infrastructure::{ConnectionRegistry, SessionGuard},
};

use super::error::JoinError;

/// チャット参加のユースケース
pub struct JoinChatUseCase {
    registry: ConnectionRegistry,
}

impl JoinChatUseCase {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// セッションを登録
    ///
    /// この呼び出しが戻った後にブロードキャストされたメッセージは `handle` に届きます。
    /// 登録前のメッセージが遡って届くことはありません。
    ///
    /// # Errors
    ///
    /// 同じ ClientId のセッションが有効な場合は `JoinError::AlreadyJoined`
    pub fn register(
        &self,
        client_id: ClientId,
        handle: SharedHandle,
    ) -> Result<SessionGuard, JoinError> {
        let session = self.registry.try_register(client_id, handle)?;
        tracing::info!(
            "Client '{}' joined (session {}, {} joined)",
            session.client_id(),
            session.session_id(),
            self.registry.len()
        );
        Ok(session)
    }

    /// 接続が終了するまでセッションを維持し、終了したら登録を解除
    pub async fn hold_until<F>(&self, session: SessionGuard, session_end: F)
    where
        F: Future<Output = ()>,
    {
        session_end.await;
        tracing::debug!(
            "Session {} of client '{}' terminated",
            session.session_id(),
            session.client_id()
        );
        drop(session);
    }

    /// join を実行
    ///
    /// セッションを登録し、`session_end` が完了するまで待機し、登録を解除して戻ります。
    ///
    /// # Errors
    ///
    /// 同じ ClientId のセッションが有効な場合は `JoinError::AlreadyJoined`（待機せずに即座に戻る）
    pub async fn execute<F>(
        &self,
        client_id: ClientId,
        handle: SharedHandle,
        session_end: F,
    ) -> Result<(), JoinError>
    where
        F: Future<Output = ()>,
    {
        let session = self.register(client_id, handle)?;
        self.hold_until(session, session_end).await;
        Ok(())
    }
}
