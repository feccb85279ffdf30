//! UseCase errors.

use thiserror::Error;

use crate::domain::{ClientId, RegistryError};

/// join（セッション開始）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// 同じ ClientId のセッションが既に有効
    #[error("Client ID '{0}' is already connected")]
    AlreadyJoined(ClientId),
}

impl From<RegistryError> for JoinError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::AlreadyJoined(client_id) => Self::AlreadyJoined(client_id),
        }
    }
}
