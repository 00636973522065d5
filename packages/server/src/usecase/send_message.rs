//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 本文の検証、保存、全員へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 保存に成功したメッセージだけが通知されることを保証する
//! - 空のメッセージが保存も通知もされないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者を含む全員へのブロードキャスト
//! - 異常系：保存失敗（ブロードキャストしない）
//! - エッジケース：空白のみの本文

use std::sync::Arc;

use crate::domain::{
    BroadcastEngine, ChatMessage, ConnectionId, DisplayName, MessageStore, MessageText,
    OutboundEvent, StoredMessage,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    store: Arc<dyn MessageStore>,
    broadcast: Arc<dyn BroadcastEngine>,
}

impl SendMessageUseCase {
    pub fn new(store: Arc<dyn MessageStore>, broadcast: Arc<dyn BroadcastEngine>) -> Self {
        Self { store, broadcast }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `origin` - 送信元の接続 ID
    /// * `author` - 送信者の表示名（コピーとして保存される）
    /// * `raw_text` - 受信したままの本文
    ///
    /// # Returns
    ///
    /// * `Ok(StoredMessage)` - 保存され、ブロードキャストされたメッセージ
    /// * `Err(SendMessageError::Validation)` - 空の本文
    /// * `Err(SendMessageError::Storage)` - 保存失敗（ブロードキャストしない）
    pub async fn execute(
        &self,
        origin: &ConnectionId,
        author: &DisplayName,
        raw_text: String,
    ) -> Result<StoredMessage, SendMessageError> {
        // 1. 本文の検証（trim 後に空なら破棄）
        let text = MessageText::new(raw_text)?;

        // 2. 保存（ID と作成時刻が割り当てられる）
        let message = ChatMessage::new(text, author.clone(), origin.clone());
        let stored = self.store.append(message).await?;

        // 3. 送信者を含む全員にブロードキャスト
        let delivered = self
            .broadcast
            .broadcast_all(&OutboundEvent::Message(stored.clone()))
            .await;
        tracing::debug!(
            "Message '{}' from '{}' delivered to {} connections",
            stored.id.as_str(),
            author,
            delivered
        );

        Ok(stored)
    }
}
