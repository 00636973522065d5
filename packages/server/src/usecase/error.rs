//! UseCase layer error types.

use thiserror::Error;

use crate::domain::{AuthError, RegistryError, StorageError, ValueObjectError};

/// ハンドシェイク失敗（接続は ACTIVE にならない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("handshake already completed")]
    NotHandshaking,
}

impl HandshakeError {
    /// クライアントに返すメッセージ
    pub fn client_message(&self) -> String {
        match self {
            Self::Auth(e) => e.to_string(),
            Self::Registry(_) | Self::NotHandshaking => "connection rejected".to_string(),
        }
    }
}

/// メッセージ送信失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// 空のメッセージ（通知せずに破棄する）
    #[error(transparent)]
    Validation(#[from] ValueObjectError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// 履歴削除失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClearHistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
