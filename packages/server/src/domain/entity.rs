//! Domain entities.

use super::{
    broadcast::PusherChannel,
    value_object::{ConnectionId, DisplayName, MessageId, MessageText, Timestamp, UserId},
};

/// 検証済みトークンから取り出したユーザーの身元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: DisplayName,
}

impl Identity {
    pub fn new(user_id: UserId, display_name: DisplayName) -> Self {
        Self {
            user_id,
            display_name,
        }
    }
}

/// 接続のライフサイクル状態
///
/// `Handshaking -> Active -> Closed` の一方向にのみ遷移する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Handshaking,
    Active,
    Closed,
}

/// ConnectionRegistry に登録された接続
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Identity,
    pub state: ConnectionState,
    /// この接続のアウトバウンドキュー
    pub channel: PusherChannel,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        identity: Identity,
        channel: PusherChannel,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            id,
            identity,
            state: ConnectionState::Active,
            channel,
            connected_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }
}

/// 保存前のチャットメッセージ
///
/// 作成者は表示名のコピーで保持し、接続そのものは参照しない。
/// 接続が閉じた後もメッセージは残るため。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: MessageText,
    pub author: DisplayName,
    pub origin: ConnectionId,
    /// `None` の場合は MessageStore が保存時に割り当てる
    pub created_at: Option<Timestamp>,
}

impl ChatMessage {
    pub fn new(text: MessageText, author: DisplayName, origin: ConnectionId) -> Self {
        Self {
            text,
            author,
            origin,
            created_at: None,
        }
    }
}

/// MessageStore に保存されたメッセージ（ID と作成時刻が確定済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: MessageId,
    pub text: MessageText,
    pub author: DisplayName,
    pub origin: ConnectionId,
    pub created_at: Timestamp,
}

impl StoredMessage {
    pub fn from_message(message: ChatMessage, id: MessageId, created_at: Timestamp) -> Self {
        Self {
            id,
            text: message.text,
            author: message.author,
            origin: message.origin,
            created_at,
        }
    }
}
