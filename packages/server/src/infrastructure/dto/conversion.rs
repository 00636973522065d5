//! Conversion logic between DTOs and domain types.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{InboundEvent, OutboundEvent, StoredMessage};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain
// ========================================

impl From<dto::ClientEvent> for InboundEvent {
    fn from(dto: dto::ClientEvent) -> Self {
        match dto {
            dto::ClientEvent::Message { text } => Self::Message {
                text: text.unwrap_or_default(),
            },
            dto::ClientEvent::Typing {} => Self::Typing,
            dto::ClientEvent::StopTyping {} => Self::StopTyping,
            dto::ClientEvent::ClearHistory {} => Self::ClearHistory,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&StoredMessage> for dto::StoredMessageDto {
    fn from(model: &StoredMessage) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            text: model.text.as_str().to_string(),
            author: model.author.as_str().to_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&OutboundEvent> for dto::ServerEvent {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::PreviousMessages(messages) => Self::PreviousMessages {
                messages: messages.iter().map(Into::into).collect(),
            },
            OutboundEvent::Message(message) => Self::Message(message.into()),
            OutboundEvent::Typing(signal) => Self::Typing {
                author: signal.author.as_str().to_string(),
            },
            OutboundEvent::StopTyping(signal) => Self::StopTyping {
                author: signal.author.as_str().to_string(),
            },
            OutboundEvent::HistoryCleared => Self::HistoryCleared {},
            OutboundEvent::ClearHistoryError { message } => Self::ClearHistoryError {
                message: message.clone(),
            },
            OutboundEvent::ConnectError { message } => Self::ConnectError {
                message: message.clone(),
            },
        }
    }
}

/// Encode a domain event into a JSON text frame
pub fn encode_event(event: &OutboundEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::ServerEvent::from(event))
}

/// Decode a JSON text frame into a domain event
pub fn decode_event(text: &str) -> Result<InboundEvent, serde_json::Error> {
    serde_json::from_str::<dto::ClientEvent>(text).map(Into::into)
}
