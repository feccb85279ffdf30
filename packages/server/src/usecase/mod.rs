//! UseCase 層
//!
//! - `join_chat`: セッションの登録と、接続終了までの維持
//! - `send_message`: 送信メッセージのブロードキャスト
//! - `broadcast`: Registry のスナップショットに対する配信（Broadcast Dispatcher）
//! - `list_clients`: 接続中クライアントの一覧

pub mod broadcast;
pub mod error;
pub mod join_chat;
pub mod list_clients;
pub mod send_message;

pub use broadcast::{BroadcastDispatcher, DeliveryOutcome, DispatchResult};
pub use error::JoinError;
pub use join_chat::JoinChatUseCase;
pub use list_clients::ListClientsUseCase;
pub use send_message::{SendMessageUseCase, SendOutcome};
