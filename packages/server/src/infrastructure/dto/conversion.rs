//! Conversion logic between DTOs and domain entities.

use hiroba_shared::protocol::{AcknowledgmentDto, ChatMessageDto};

use crate::domain::{Acknowledgment, ChatMessage};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<ChatMessageDto> for ChatMessage {
    fn from(dto: ChatMessageDto) -> Self {
        Self {
            client_id: dto.client_id,
            username: dto.username,
            content: dto.content,
            timestamp: dto.timestamp,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            client_id: model.client_id,
            username: model.username,
            content: model.content,
            timestamp: model.timestamp,
        }
    }
}

impl From<Acknowledgment> for AcknowledgmentDto {
    fn from(model: Acknowledgment) -> Self {
        Self {
            success: model.success,
        }
    }
}
