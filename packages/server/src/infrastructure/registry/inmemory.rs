//! InMemory ConnectionRegistry 実装
//!
//! 接続中のクライアントを `HashMap` で管理します。登録・解除・スナップショット
//! 取得はすべて同じ Mutex の下で行われるため、ブロードキャストが中途半端に
//! 更新されたメンバー集合を見ることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, ConnectionRegistry, Identity, PusherChannel, RegistryError,
    Timestamp,
};

/// インメモリ ConnectionRegistry 実装
pub struct InMemoryConnectionRegistry {
    /// Key: ConnectionId
    /// Value: Connection（アウトバウンドキューを含む）
    connections: Mutex<HashMap<ConnectionId, Connection>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryConnectionRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(
        &self,
        connection_id: ConnectionId,
        identity: Identity,
        channel: PusherChannel,
    ) -> Result<Connection, RegistryError> {
        let mut connections = self.connections.lock().await;
        if connections.contains_key(&connection_id) {
            return Err(RegistryError::DuplicateConnection(
                connection_id.into_string(),
            ));
        }

        let connection = Connection::new(
            connection_id.clone(),
            identity,
            channel,
            Timestamp::new(self.clock.now_millis()),
        );
        connections.insert(connection_id, connection.clone());
        tracing::debug!(
            "Connection '{}' registered ({} live)",
            connection.id,
            connections.len()
        );

        Ok(connection)
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(connection_id);
        if removed.is_some() {
            tracing::debug!(
                "Connection '{}' unregistered ({} live)",
                connection_id,
                connections.len()
            );
        }
        removed
    }

    async fn snapshot(&self) -> Vec<Connection> {
        let connections = self.connections.lock().await;
        connections
            .values()
            .filter(|connection| connection.is_active())
            .cloned()
            .collect()
    }

    async fn get(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let connections = self.connections.lock().await;
        connections.get(connection_id).cloned()
    }

    async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}
