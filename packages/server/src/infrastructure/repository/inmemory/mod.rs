//! InMemory repository implementations.

pub mod message;

pub use message::InMemoryMessageStore;
