//! Broadcast Dispatcher
//!
//! Registry のスナップショットを取り、全ハンドルへメッセージを配信します。
//!
//! ## 配信ポリシー
//!
//! - 1 つのハンドルへの配信失敗が、他のハンドルへの配信を妨げることはない
//! - 配信に失敗したセッションは切断済みとみなし、そのセッションのみ Registry から削除する
//! - 結果は受信者ごとに `DispatchResult` に集約し、呼び出し側が扱いを決める

use crate::{
    domain::{ChatMessage, ClientId, DeliveryError, SessionId},
    infrastructure::ConnectionRegistry,
};

/// 1 受信者への配信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub client_id: ClientId,
    pub session_id: SessionId,
    pub result: Result<(), DeliveryError>,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// 1 回のブロードキャストの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    outcomes: Vec<DeliveryOutcome>,
}

impl DispatchResult {
    /// 受信者ごとの結果（順序は不定）
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    /// 配信を試行した受信者数
    pub fn recipients(&self) -> usize {
        self.outcomes.len()
    }

    /// 配信に成功した受信者数
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    /// 配信に失敗した受信者
    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| !o.is_delivered())
    }

    /// 全受信者への配信に成功したかどうか（受信者 0 人の場合も `true`）
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(DeliveryOutcome::is_delivered)
    }

    /// 指定したクライアントへ配信できたかどうか
    pub fn delivered_to(&self, client_id: &ClientId) -> bool {
        self.outcomes
            .iter()
            .any(|o| &o.client_id == client_id && o.is_delivered())
    }
}

/// 接続中の全セッションへのブロードキャスト
pub struct BroadcastDispatcher {
    registry: ConnectionRegistry,
}

impl BroadcastDispatcher {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// メッセージを接続中の全セッション（送信者自身を含む）へ配信
    ///
    /// Registry のロックはスナップショット取得時のみ保持し、配信中は保持しません。
    /// スナップショット取得後に join したセッションには配信されません。
    pub fn broadcast(&self, message: &ChatMessage) -> DispatchResult {
        let targets = self.registry.snapshot_for_broadcast();

        let outcomes = targets
            .into_iter()
            .map(|target| {
                let result = target.handle.try_send(message.clone());
                match &result {
                    Ok(()) => {
                        tracing::debug!("Broadcasted message to client '{}'", target.client_id);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to push message to client '{}': {}. Removing session {}",
                            target.client_id,
                            e,
                            target.session_id
                        );
                        self.registry
                            .unregister_session(&target.client_id, target.session_id);
                    }
                }
                DeliveryOutcome {
                    client_id: target.client_id,
                    session_id: target.session_id,
                    result,
                }
            })
            .collect();

        DispatchResult { outcomes }
    }
}
