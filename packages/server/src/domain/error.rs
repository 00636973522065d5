//! Domain error types.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// Message text was empty after trimming
    #[error("message text must not be empty")]
    EmptyMessageText,

    #[error("message id must not be empty")]
    EmptyMessageId,
}

/// Token issuing / verification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,

    /// Malformed, badly signed or expired token
    #[error("invalid token")]
    InvalidToken,

    #[error("handshake timed out")]
    Timeout,

    #[error("failed to issue token: {0}")]
    Issue(String),
}

/// Message store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("message store unavailable: {0}")]
    Unavailable(String),
}

/// Connection registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(String),
}

/// Per-recipient delivery errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    /// Outbound queue of a slow consumer is full
    #[error("outbound queue of connection '{0}' is full")]
    ChannelFull(String),

    #[error("connection '{0}' is disconnected")]
    Disconnected(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}
