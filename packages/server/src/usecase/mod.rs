//! UseCase layer
//!
//! 各ユースケースはドメイン層の trait（MessageStore, ConnectionRegistry,
//! BroadcastEngine, AuthService）にのみ依存します。
//! `SessionHandler` が接続ごとにこれらを組み合わせて状態遷移を駆動します。

mod clear_history;
mod connect_session;
mod disconnect_session;
mod error;
mod relay_typing;
mod send_message;
mod session;

#[cfg(test)]
mod test_support;

pub use clear_history::{CLEAR_HISTORY_ERROR_MESSAGE, ClearHistoryUseCase};
pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{ClearHistoryError, HandshakeError, SendMessageError};
pub use relay_typing::RelayTypingUseCase;
pub use send_message::SendMessageUseCase;
pub use session::{SessionHandler, SessionServices};
