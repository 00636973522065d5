//! Events flowing in and out of a session.

use super::{entity::StoredMessage, value_object::DisplayName};

/// クライアントから届くイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// 本文は未検証（trim 前）
    Message { text: String },
    Typing,
    StopTyping,
    ClearHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingKind {
    Started,
    Stopped,
}

/// 入力中シグナル（永続化しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSignal {
    pub author: DisplayName,
}

/// クライアントへ送るイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// ハンドシェイク直後に一度だけ送る履歴（古い順）
    PreviousMessages(Vec<StoredMessage>),
    Message(StoredMessage),
    Typing(TypingSignal),
    StopTyping(TypingSignal),
    HistoryCleared,
    ClearHistoryError { message: String },
    /// ハンドシェイク失敗時に切断前に送る
    ConnectError { message: String },
}

impl OutboundEvent {
    pub fn typing(kind: TypingKind, author: DisplayName) -> Self {
        let signal = TypingSignal { author };
        match kind {
            TypingKind::Started => Self::Typing(signal),
            TypingKind::Stopped => Self::StopTyping(signal),
        }
    }

    /// Event name as seen on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::PreviousMessages(_) => "previous messages",
            Self::Message(_) => "message",
            Self::Typing(_) => "typing",
            Self::StopTyping(_) => "stop typing",
            Self::HistoryCleared => "history cleared",
            Self::ClearHistoryError { .. } => "clear history error",
            Self::ConnectError { .. } => "connect error",
        }
    }
}
