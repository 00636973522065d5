//! UseCase: 履歴の全削除
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ClearHistoryUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 削除成功時は全員に `history cleared` が届くことを保証する
//! - 削除失敗時はエラーが要求者にだけ届くことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：削除と全員への通知
//! - 異常系：ストアの障害
//! - エッジケース：連続した 2 回の削除

use std::sync::Arc;

use crate::domain::{BroadcastEngine, ConnectionId, DisplayName, MessageStore, OutboundEvent};

use super::error::ClearHistoryError;

/// 削除失敗時に要求者へ返すメッセージ
pub const CLEAR_HISTORY_ERROR_MESSAGE: &str = "Could not clear history.";

/// 履歴削除のユースケース
pub struct ClearHistoryUseCase {
    store: Arc<dyn MessageStore>,
    broadcast: Arc<dyn BroadcastEngine>,
}

impl ClearHistoryUseCase {
    pub fn new(store: Arc<dyn MessageStore>, broadcast: Arc<dyn BroadcastEngine>) -> Self {
        Self { store, broadcast }
    }

    /// 履歴削除を実行
    ///
    /// # Arguments
    ///
    /// * `requester` - 削除を要求した接続の ID
    /// * `requested_by` - 要求者の表示名（ログ用）
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 削除件数（全員に `history cleared` を通知済み）
    /// * `Err(ClearHistoryError)` - 削除失敗（要求者にだけエラーを通知済み）
    pub async fn execute(
        &self,
        requester: &ConnectionId,
        requested_by: &DisplayName,
    ) -> Result<usize, ClearHistoryError> {
        match self.store.clear_all().await {
            Ok(cleared) => {
                self.broadcast
                    .broadcast_all(&OutboundEvent::HistoryCleared)
                    .await;
                tracing::info!(
                    "{} cleared the chat history ({} messages)",
                    requested_by,
                    cleared
                );
                Ok(cleared)
            }
            Err(e) => {
                tracing::error!("Clear history error: {}", e);
                let event = OutboundEvent::ClearHistoryError {
                    message: CLEAR_HISTORY_ERROR_MESSAGE.to_string(),
                };
                if let Err(push_error) = self.broadcast.push_to(requester, &event).await {
                    tracing::warn!("Failed to report clear history error: {}", push_error);
                }
                Err(e.into())
            }
        }
    }
}
