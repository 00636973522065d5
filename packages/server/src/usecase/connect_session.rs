//! UseCase: ハンドシェイクと履歴のバックフィル
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() と backfill()
//!
//! ### なぜこのテストが必要か
//! - 不正なトークンの接続がレジストリに入らないことを保証する
//! - バックフィルが本人にだけ、最新 N 件を古い順で届くことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンでの接続とバックフィル
//! - 異常系：トークンなし・不正・期限切れ・検証タイムアウト・重複接続
//! - エッジケース：バックフィル取得の失敗（接続は維持される）

use std::{sync::Arc, time::Duration};

use crate::domain::{
    AuthError, AuthService, BroadcastEngine, ConnectionId, ConnectionRegistry, Identity,
    MessageStore, OutboundEvent, PusherChannel,
};

use super::error::HandshakeError;

/// ハンドシェイクのユースケース
pub struct ConnectSessionUseCase {
    auth: Arc<dyn AuthService>,
    registry: Arc<dyn ConnectionRegistry>,
    store: Arc<dyn MessageStore>,
    broadcast: Arc<dyn BroadcastEngine>,
    /// トークン検証のタイムアウト
    handshake_timeout: Duration,
    /// バックフィルの最大件数
    backfill_limit: usize,
}

impl ConnectSessionUseCase {
    pub fn new(
        auth: Arc<dyn AuthService>,
        registry: Arc<dyn ConnectionRegistry>,
        store: Arc<dyn MessageStore>,
        broadcast: Arc<dyn BroadcastEngine>,
        handshake_timeout: Duration,
        backfill_limit: usize,
    ) -> Self {
        Self {
            auth,
            registry,
            store,
            broadcast,
            handshake_timeout,
            backfill_limit,
        }
    }

    /// トークンを検証し、接続をレジストリに登録する
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 新しい接続の ID
    /// * `token` - 接続確立時に渡されたトークン（空文字列はトークンなしと同じ）
    /// * `channel` - この接続のアウトバウンドキュー
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - 登録された接続の身元
    /// * `Err(HandshakeError)` - 接続拒否（レジストリには何も残らない）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        token: Option<&str>,
        channel: PusherChannel,
    ) -> Result<Identity, HandshakeError> {
        // 1. トークンの存在チェック
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        // 2. タイムアウト付きでトークンを検証
        let identity = tokio::time::timeout(self.handshake_timeout, self.auth.verify(token))
            .await
            .map_err(|_| AuthError::Timeout)??;

        // 3. レジストリに登録
        self.registry
            .register(connection_id, identity.clone(), channel)
            .await?;

        Ok(identity)
    }

    /// 最新の履歴をこの接続にだけ送る
    ///
    /// 取得や送信に失敗してもログに残すだけで、接続は維持する。
    ///
    /// # Returns
    ///
    /// 送信したメッセージ件数
    pub async fn backfill(&self, connection_id: &ConnectionId) -> usize {
        let messages = match self.store.recent(self.backfill_limit).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!("Fetch messages error for '{}': {}", connection_id, e);
                return 0;
            }
        };

        let count = messages.len();
        let event = OutboundEvent::PreviousMessages(messages);
        if let Err(e) = self.broadcast.push_to(connection_id, &event).await {
            tracing::warn!("Failed to send previous messages: {}", e);
            return 0;
        }
        tracing::debug!(
            "Sent {} previous messages to '{}'",
            count,
            connection_id
        );
        count
    }
}
