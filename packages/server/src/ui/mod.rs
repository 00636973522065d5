//! UI layer: HTTP and WebSocket endpoints.

mod handler;
mod server;
mod signal;
mod state;

pub use server::Server;
pub use signal::shutdown_signal;
pub use state::AppState;
