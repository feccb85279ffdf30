//! Data Transfer Objects (DTOs) for the relay.
//!
//! wire DTO 自体は `hiroba_shared::protocol` に定義されており、クライアントと共有します。
//! このモジュールは Domain Model との変換のみを提供します。

pub mod conversion;

pub use hiroba_shared::protocol::{AcknowledgmentDto, ChatMessageDto, ClientListDto, JoinQuery};
