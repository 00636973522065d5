//! Domain layer for the chat server.
//!
//! Entities, value objects and the trait seams (`MessageStore`,
//! `ConnectionRegistry`, `BroadcastEngine`, `AuthService`) the use cases
//! depend on. Concrete implementations live in the infrastructure layer.

pub mod auth;
pub mod broadcast;
pub mod entity;
pub mod error;
pub mod event;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use auth::{AuthService, IdentityToken};
pub use broadcast::{BroadcastEngine, PusherChannel};
pub use entity::{ChatMessage, Connection, ConnectionState, Identity, StoredMessage};
pub use error::{AuthError, DeliveryError, RegistryError, StorageError, ValueObjectError};
pub use event::{InboundEvent, OutboundEvent, TypingKind, TypingSignal};
pub use registry::ConnectionRegistry;
pub use repository::{DEFAULT_BACKFILL_LIMIT, MessageStore};
pub use value_object::{
    ConnectionId, ConnectionIdFactory, DisplayName, MessageId, MessageText, Timestamp, UserId,
};
