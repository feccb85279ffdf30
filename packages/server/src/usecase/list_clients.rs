//! UseCase: 接続中クライアント一覧の取得

use crate::{domain::ClientId, infrastructure::ConnectionRegistry};

/// 接続中クライアント一覧取得のユースケース
pub struct ListClientsUseCase {
    registry: ConnectionRegistry,
}

impl ListClientsUseCase {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// 接続中の ClientId 一覧（昇順）を返す
    pub fn execute(&self) -> Vec<ClientId> {
        self.registry.client_ids()
    }
}
