//! UseCase: 入力中シグナルの中継
//!
//! 永続化はせず、送信者以外の全員に `typing` / `stop typing` を届ける。

use std::sync::Arc;

use crate::domain::{BroadcastEngine, ConnectionId, DisplayName, OutboundEvent, TypingKind};

/// 入力中シグナル中継のユースケース
pub struct RelayTypingUseCase {
    broadcast: Arc<dyn BroadcastEngine>,
}

impl RelayTypingUseCase {
    pub fn new(broadcast: Arc<dyn BroadcastEngine>) -> Self {
        Self { broadcast }
    }

    /// 送信者以外に中継し、届いた接続数を返す
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        author: &DisplayName,
        kind: TypingKind,
    ) -> usize {
        let event = OutboundEvent::typing(kind, author.clone());
        self.broadcast.broadcast_others(&event, sender).await
    }
}
