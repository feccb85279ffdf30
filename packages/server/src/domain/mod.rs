//! Domain 層
//!
//! 値オブジェクト（ClientId, SessionId）、エンティティ（ChatMessage）、
//! 送信ハンドルの抽象（OutboundHandle）を定義します。
//! Infrastructure 層はこの層の trait を実装します（依存性の逆転）。

pub mod entity;
pub mod error;
pub mod handle;
pub mod value_object;

pub use entity::{Acknowledgment, ChatMessage};
pub use error::{ClientIdError, DeliveryError, RegistryError};
#[cfg(test)]
pub use handle::MockOutboundHandle;
pub use handle::{OutboundHandle, SharedHandle};
pub use value_object::{ClientId, SessionId};
