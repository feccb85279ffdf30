//! InMemory Connection Registry 実装
//!
//! 接続中のクライアントと、その送信ハンドルの対応を保持します。
//!
//! ## 不変条件
//!
//! - Registry に含まれるのは join セッションがまだ有効なクライアントのみ
//! - 変更（登録・削除）とブロードキャスト用スナップショットは単一の Mutex で排他され、
//!   作りかけのエントリが観測されることはない
//! - Mutex はハンドルへの送信中には保持しない（スナップショットをコピーしてから解放する）
//!
//! ## ロック
//!
//! `std::sync::Mutex` を使います。クリティカルセクションは HashMap の操作のみで、
//! `.await` をまたぐことはありません。これにより `SessionGuard` の `Drop` から同期的に
//! 登録解除できます。

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::domain::{ClientId, RegistryError, SessionId, SharedHandle};

/// Registry 内部の 1 エントリ
struct SessionEntry {
    session_id: SessionId,
    handle: SharedHandle,
}

/// スナップショットに含まれる 1 セッション
#[derive(Clone)]
pub struct RegisteredSession {
    pub client_id: ClientId,
    pub session_id: SessionId,
    pub handle: SharedHandle,
}

/// 接続中セッションの Registry
///
/// `Clone` は同じ Registry を共有するハンドルを返します（内部は `Arc`）。
/// サーバー起動時に 1 つ作成し、プロセス終了まで各ハンドラーで共有します。
///
/// ## 使用例
///
/// ```ignore
/// let registry = ConnectionRegistry::new();
/// let (handle, rx) = ChannelHandle::channel();
///
/// let guard = registry.try_register(client_id, Arc::new(handle))?;
/// // ... セッション中 ...
/// drop(guard); // 登録解除
/// ```
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    sessions: Arc<Mutex<HashMap<ClientId, SessionEntry>>>,
}

impl ConnectionRegistry {
    /// 空の Registry を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ロックを取得
    ///
    /// どの操作も HashMap を壊れた状態で残さないため、poison されたロックもそのまま回復して使う。
    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// クライアントを登録（既存のエントリは置き換える）
    ///
    /// 置き換えられた古いハンドルは以後ブロードキャストを受け取りません。
    /// 古いセッションの `SessionGuard` が破棄されても新しいエントリは削除されません。
    ///
    /// # Returns
    ///
    /// 新しく発行された SessionId
    pub fn register(&self, client_id: ClientId, handle: SharedHandle) -> SessionId {
        let session_id = SessionId::generate();
        let replaced = self
            .lock()
            .insert(client_id.clone(), SessionEntry { session_id, handle });

        match replaced {
            Some(previous) => tracing::debug!(
                "Client '{}' re-registered: session {} replaced by {}",
                client_id,
                previous.session_id,
                session_id
            ),
            None => tracing::debug!(
                "Client '{}' registered with session {}",
                client_id,
                session_id
            ),
        }

        session_id
    }

    /// クライアントを登録（同じ ClientId が既に登録済みなら拒否する）
    ///
    /// # Errors
    ///
    /// 同じ ClientId のセッションが有効な場合は `RegistryError::AlreadyJoined`
    ///
    /// # Returns
    ///
    /// 破棄されたときに登録を解除する `SessionGuard`
    pub fn try_register(
        &self,
        client_id: ClientId,
        handle: SharedHandle,
    ) -> Result<SessionGuard, RegistryError> {
        let session_id = SessionId::generate();

        match self.lock().entry(client_id.clone()) {
            Entry::Occupied(_) => return Err(RegistryError::AlreadyJoined(client_id)),
            Entry::Vacant(slot) => {
                slot.insert(SessionEntry { session_id, handle });
            }
        }

        tracing::debug!(
            "Client '{}' registered with session {}",
            client_id,
            session_id
        );

        Ok(SessionGuard {
            registry: self.clone(),
            client_id,
            session_id,
        })
    }

    /// クライアントの登録を解除
    ///
    /// 未登録のクライアントに対しては何もしません（冪等）。
    ///
    /// # Returns
    ///
    /// エントリを削除した場合は `true`
    pub fn unregister(&self, client_id: &ClientId) -> bool {
        let removed = self.lock().remove(client_id).is_some();
        if removed {
            tracing::debug!("Client '{}' unregistered", client_id);
        }
        removed
    }

    /// 指定したセッションの登録のみを解除
    ///
    /// 同じ ClientId でも別のセッションが登録されている場合は何もしません。
    ///
    /// # Returns
    ///
    /// エントリを削除した場合は `true`
    pub fn unregister_session(&self, client_id: &ClientId, session_id: SessionId) -> bool {
        let mut sessions = self.lock();
        let owned = sessions
            .get(client_id)
            .is_some_and(|entry| entry.session_id == session_id);
        if !owned {
            return false;
        }
        sessions.remove(client_id);
        drop(sessions);

        tracing::debug!(
            "Client '{}' session {} unregistered",
            client_id,
            session_id
        );
        true
    }

    /// ブロードキャスト用のスナップショットを取得
    ///
    /// ロック中にエントリをコピーし、ロックを解放してから返します。
    /// 呼び出し側はロックを気にせず各ハンドルへ送信できます。順序は不定です。
    pub fn snapshot_for_broadcast(&self) -> Vec<RegisteredSession> {
        self.lock()
            .iter()
            .map(|(client_id, entry)| RegisteredSession {
                client_id: client_id.clone(),
                session_id: entry.session_id,
                handle: entry.handle.clone(),
            })
            .collect()
    }

    /// 登録中のクライアント数
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.lock().contains_key(client_id)
    }

    /// 登録中の ClientId 一覧（昇順）
    pub fn client_ids(&self) -> Vec<ClientId> {
        let mut ids: Vec<ClientId> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// 有効な 1 セッションの登録
///
/// 破棄されると自分自身のセッションの登録を解除します。
/// 接続終了・タスクの abort・サーバー停止のいずれの経路でも、登録解除はちょうど 1 回行われます。
#[must_use = "dropping the guard ends the session immediately"]
pub struct SessionGuard {
    registry: ConnectionRegistry,
    client_id: ClientId,
    session_id: SessionId,
}

impl SessionGuard {
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self
            .registry
            .unregister_session(&self.client_id, self.session_id)
        {
            tracing::info!(
                "Client '{}' disconnected and removed from registry",
                self.client_id
            );
        } else {
            tracing::debug!(
                "Client '{}' session {} was already removed from registry",
                self.client_id,
                self.session_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatMessage, OutboundHandle},
        infrastructure::ChannelHandle,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 登録・登録解除・スナップショットの基本操作
    // - 重複 join の拒否と、置き換え登録
    // - SessionGuard の破棄による登録解除
    // - 並行操作で登録の欠落・幽霊エントリが生じないこと
    //
    // 【なぜこのテストが必要か】
    // - Registry はサーバー内で唯一の共有可変状態
    // - 「Registry に含まれるのは有効なセッションのみ」という不変条件を保証する必要がある
    // ========================================

    fn client_id(value: &str) -> ClientId {
        ClientId::new(value.to_string()).unwrap()
    }

    fn handle() -> (SharedHandle, tokio::sync::mpsc::Receiver<ChatMessage>) {
        let (handle, rx) = ChannelHandle::channel();
        (Arc::new(handle), rx)
    }

    #[test]
    fn test_try_register_adds_entry() {
        // テスト項目: try_register でクライアントが登録される
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (h, _rx) = handle();

        // when (操作):
        let guard = registry.try_register(client_id("a1"), h).unwrap();

        // then (期待する結果):
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&client_id("a1")));
        assert_eq!(guard.client_id(), &client_id("a1"));
    }

    #[test]
    fn test_join_order_does_not_affect_membership() {
        // テスト項目: 登録順序に関係なく、最終的な登録メンバーは同じになる
        // given (前提条件):
        let forward = ConnectionRegistry::new();
        let backward = ConnectionRegistry::new();
        let ids = ["a1", "b1", "c1", "d1"];

        // when (操作):
        let mut guards = Vec::new();
        for id in ids {
            let (h, _rx) = handle();
            guards.push(forward.try_register(client_id(id), h).unwrap());
        }
        for id in ids.iter().rev() {
            let (h, _rx) = handle();
            guards.push(backward.try_register(client_id(id), h).unwrap());
        }

        // then (期待する結果):
        assert_eq!(forward.client_ids(), backward.client_ids());
        assert_eq!(
            forward.client_ids(),
            ids.iter().map(|id| client_id(id)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_try_register_rejects_duplicate_client_id() {
        // テスト項目: 既に join 済みの ClientId での登録は AlreadyJoined で拒否される
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (first, _rx1) = handle();
        let (second, _rx2) = handle();
        let guard = registry.try_register(client_id("a1"), first).unwrap();

        // when (操作):
        let result = registry.try_register(client_id("a1"), second);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(RegistryError::AlreadyJoined(ref id)) if id == &client_id("a1")
        ));
        assert_eq!(registry.len(), 1);
        // 既存のセッションはそのまま
        let snapshot = registry.snapshot_for_broadcast();
        assert_eq!(snapshot[0].session_id, guard.session_id());
    }

    #[test]
    fn test_register_replaces_existing_entry() {
        // テスト項目: register は既存のエントリを置き換え、以後は新しいハンドルのみが対象になる
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (old, mut old_rx) = handle();
        let (new, mut new_rx) = handle();
        let old_session = registry.register(client_id("a1"), old);

        // when (操作):
        let new_session = registry.register(client_id("a1"), new);

        // then (期待する結果):
        assert_ne!(old_session, new_session);
        let snapshot = registry.snapshot_for_broadcast();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].session_id, new_session);

        let message = ChatMessage {
            client_id: "a1".to_string(),
            username: "alice".to_string(),
            content: "hi".to_string(),
            timestamp: 1000,
        };
        snapshot[0].handle.try_send(message.clone()).unwrap();
        assert_eq!(new_rx.try_recv().unwrap(), message);
        assert!(old_rx.try_recv().is_err());
    }

    #[test]
    fn test_unregister_removes_entry() {
        // テスト項目: unregister で登録が解除される
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (h, _rx) = handle();
        registry.register(client_id("a1"), h);

        // when (操作):
        let removed = registry.unregister(&client_id("a1"));

        // then (期待する結果):
        assert!(removed);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_unknown_client_is_noop() {
        // テスト項目: 未登録クライアントの unregister は何もせず、他のエントリに影響しない（冪等性）
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (h, _rx) = handle();
        registry.register(client_id("a1"), h);

        // when (操作):
        let first = registry.unregister(&client_id("ghost"));
        let second = registry.unregister(&client_id("ghost"));

        // then (期待する結果):
        assert!(!first);
        assert!(!second);
        assert_eq!(registry.client_ids(), vec![client_id("a1")]);
    }

    #[test]
    fn test_unregister_session_ignores_other_session() {
        // テスト項目: 別セッションの SessionId では登録解除されない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (old, _rx1) = handle();
        let (new, _rx2) = handle();
        let old_session = registry.register(client_id("a1"), old);
        let new_session = registry.register(client_id("a1"), new);

        // when (操作):
        let removed_old = registry.unregister_session(&client_id("a1"), old_session);

        // then (期待する結果):
        assert!(!removed_old);
        assert!(registry.contains(&client_id("a1")));
        assert!(registry.unregister_session(&client_id("a1"), new_session));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dropping_guard_unregisters_session() {
        // テスト項目: SessionGuard を破棄すると登録が解除され、件数がちょうど 1 減る
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (h1, _rx1) = handle();
        let (h2, _rx2) = handle();
        let guard_a = registry.try_register(client_id("a1"), h1).unwrap();
        let _guard_b = registry.try_register(client_id("b1"), h2).unwrap();
        assert_eq!(registry.len(), 2);

        // when (操作):
        drop(guard_a);

        // then (期待する結果):
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(&client_id("a1")));
        assert!(registry.contains(&client_id("b1")));
    }

    #[test]
    fn test_stale_guard_does_not_remove_rejoined_session() {
        // テスト項目: 先に削除済みのセッションの guard 破棄が、同じ ID で再 join したセッションを消さない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (h1, _rx1) = handle();
        let (h2, _rx2) = handle();
        let stale = registry.try_register(client_id("a1"), h1).unwrap();
        // 配信失敗などで先に削除される
        registry.unregister_session(&client_id("a1"), stale.session_id());
        let rejoined = registry.try_register(client_id("a1"), h2).unwrap();

        // when (操作):
        drop(stale);

        // then (期待する結果):
        let snapshot = registry.snapshot_for_broadcast();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].session_id, rejoined.session_id());
    }

    #[test]
    fn test_snapshot_is_detached_from_registry() {
        // テスト項目: スナップショット取得後の登録・解除はスナップショットに影響しない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (h1, _rx1) = handle();
        let (h2, _rx2) = handle();
        registry.register(client_id("a1"), h1);
        let snapshot = registry.snapshot_for_broadcast();

        // when (操作):
        registry.register(client_id("b1"), h2);
        registry.unregister(&client_id("a1"));

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].client_id, client_id("a1"));
        assert_eq!(registry.client_ids(), vec![client_id("b1")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_and_leaves_are_consistent() {
        // テスト項目: 64 タスクが並行に join / 解除しても、登録の欠落や幽霊エントリが生じない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let task_count = 64;

        // when (操作): 偶数番は登録したまま、奇数番は登録後すぐに guard を破棄する
        let mut tasks = Vec::new();
        for i in 0..task_count {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let (h, rx) = handle();
                let guard = registry
                    .try_register(client_id(&format!("client-{i}")), h)
                    .unwrap();
                tokio::task::yield_now().await;
                let _ = registry.snapshot_for_broadcast();
                if i % 2 == 0 { Some((guard, rx)) } else { None }
            }));
        }
        let mut kept = Vec::new();
        for task in tasks {
            if let Some(session) = task.await.unwrap() {
                kept.push(session);
            }
        }

        // then (期待する結果):
        let expected: Vec<ClientId> = {
            let mut ids: Vec<ClientId> = (0..task_count)
                .filter(|i| i % 2 == 0)
                .map(|i| client_id(&format!("client-{i}")))
                .collect();
            ids.sort();
            ids
        };
        assert_eq!(registry.client_ids(), expected);

        drop(kept);
        assert!(registry.is_empty());
    }
}
