//! Infrastructure 層
//!
//! - `registry`: 接続中セッションのインメモリ Registry
//! - `handle`: Domain 層の `OutboundHandle` trait の具体的な実装
//! - `dto`: Domain Model と wire DTO の変換

pub mod dto;
pub mod handle;
pub mod registry;

pub use handle::ChannelHandle;
pub use registry::{ConnectionRegistry, RegisteredSession, SessionGuard};
