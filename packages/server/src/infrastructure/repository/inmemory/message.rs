//! InMemory Message Store 実装
//!
//! ドメイン層が定義する MessageStore trait の具体的な実装。
//! `Vec` を挿入順のログとして使用します。
//!
//! ## 時刻の単調性
//!
//! 壁時計は巻き戻ることがあるため、割り当てる `created_at` は直前に保存した
//! メッセージの `created_at` を下回らないように切り上げます。

use std::sync::Arc;

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, MessageId, MessageStore, StorageError, StoredMessage, Timestamp,
};

/// インメモリ Message Store 実装
pub struct InMemoryMessageStore {
    messages: Mutex<Vec<StoredMessage>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// 保存件数
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: ChatMessage) -> Result<StoredMessage, StorageError> {
        let mut messages = self.messages.lock().await;

        let requested = message
            .created_at
            .unwrap_or_else(|| Timestamp::new(self.clock.now_millis()));
        let created_at = match messages.last() {
            Some(last) => requested.max(last.created_at),
            None => requested,
        };

        let stored = StoredMessage::from_message(message, MessageId::generate(), created_at);
        messages.push(stored.clone());
        tracing::debug!(
            "Stored message '{}' from '{}' ({} total)",
            stored.id.as_str(),
            stored.author.as_str(),
            messages.len()
        );

        Ok(stored)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredMessage>, StorageError> {
        let messages = self.messages.lock().await;
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    async fn clear_all(&self) -> Result<usize, StorageError> {
        let mut messages = self.messages.lock().await;
        let cleared = messages.len();
        messages.clear();
        Ok(cleared)
    }
}
