//! WebSocket を使った BroadcastEngine 実装
//!
//! ## 責務
//!
//! - ConnectionRegistry のスナップショットを取り、各接続のキューへ送信
//! - イベントの JSON エンコード（ブロードキャストごとに一度だけ）
//!
//! ## 設計ノート
//!
//! 各接続への送信は `try_send` で行い、決して待たない。キューが満杯の
//! 遅いクライアントや切断済みのクライアントへの送信失敗はログに残して
//! スキップし、他のクライアントへの配信には影響させない。
//!
//! ソケットへの書き込み自体は UI 層の writer タスクが行う。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    domain::{
        BroadcastEngine, Connection, ConnectionId, ConnectionRegistry, DeliveryError,
        OutboundEvent,
    },
    infrastructure::dto::conversion::encode_event,
};

/// WebSocket を使った BroadcastEngine 実装
pub struct WebSocketBroadcastEngine {
    registry: Arc<dyn ConnectionRegistry>,
}

impl WebSocketBroadcastEngine {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// スナップショット内の接続へ送信し、受理された数を返す
    async fn fanout<F>(&self, event: &OutboundEvent, include: F) -> usize
    where
        F: Fn(&Connection) -> bool,
    {
        let payload = match encode_event(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to encode '{}' event: {}", event.name(), e);
                return 0;
            }
        };

        let targets = self.registry.snapshot().await;
        let mut delivered = 0;
        for connection in targets.iter().filter(|c| include(c)) {
            // ブロードキャストでは一部の送信失敗を許容
            match deliver(connection, payload.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Dropped '{}' event: {}", event.name(), e),
            }
        }

        tracing::debug!(
            "Broadcasted '{}' event to {}/{} connections",
            event.name(),
            delivered,
            targets.len()
        );
        delivered
    }
}

/// 1 つの接続のキューに非ブロッキングで積む
fn deliver(connection: &Connection, payload: String) -> Result<(), DeliveryError> {
    connection.channel.try_send(payload).map_err(|e| match e {
        TrySendError::Full(_) => DeliveryError::ChannelFull(connection.id.to_string()),
        TrySendError::Closed(_) => DeliveryError::Disconnected(connection.id.to_string()),
    })
}

#[async_trait]
impl BroadcastEngine for WebSocketBroadcastEngine {
    async fn broadcast_all(&self, event: &OutboundEvent) -> usize {
        self.fanout(event, |_| true).await
    }

    async fn broadcast_others(&self, event: &OutboundEvent, exclude: &ConnectionId) -> usize {
        self.fanout(event, |connection| &connection.id != exclude)
            .await
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), DeliveryError> {
        let connection = self
            .registry
            .get(connection_id)
            .await
            .ok_or_else(|| DeliveryError::ConnectionNotFound(connection_id.to_string()))?;
        let payload = encode_event(event).map_err(|e| DeliveryError::Encode(e.to_string()))?;

        deliver(&connection, payload)?;
        tracing::debug!(
            "Pushed '{}' event to connection '{}'",
            event.name(),
            connection_id
        );
        Ok(())
    }
}
