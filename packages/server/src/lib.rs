//! Hiroba chat server library.
//!
//! Authenticated real-time group chat over WebSocket: token handshake,
//! connection registry, ordered message log with history backfill, fanout of
//! messages and typing signals, and an administrative history wipe.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// wiring
pub mod app;
pub mod config;
