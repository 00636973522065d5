//! WebSocket event DTOs.
//!
//! Every frame is a JSON object tagged by `type`. Event names contain spaces
//! (`"stop typing"`, `"clear history"`, ...) and are part of the wire contract.

use serde::{Deserialize, Serialize};

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        text: Option<String>,
    },
    #[serde(rename = "typing")]
    Typing {},
    #[serde(rename = "stop typing")]
    StopTyping {},
    #[serde(rename = "clear history")]
    ClearHistory {},
}

/// Events sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "previous messages")]
    PreviousMessages { messages: Vec<StoredMessageDto> },
    #[serde(rename = "message")]
    Message(StoredMessageDto),
    #[serde(rename = "typing")]
    Typing { author: String },
    #[serde(rename = "stop typing")]
    StopTyping { author: String },
    #[serde(rename = "history cleared")]
    HistoryCleared {},
    #[serde(rename = "clear history error")]
    ClearHistoryError { message: String },
    #[serde(rename = "connect error")]
    ConnectError { message: String },
}

/// Stored message as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessageDto {
    pub id: String,
    pub text: String,
    pub author: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
}
