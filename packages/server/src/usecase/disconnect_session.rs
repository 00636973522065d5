//! UseCase: 切断処理
//!
//! レジストリから接続を取り除く。既に取り除かれている場合は何もしない。

use std::sync::Arc;

use crate::domain::{Connection, ConnectionId, ConnectionRegistry};

/// 切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectSessionUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// 取り除いた接続（既に存在しなければ `None`）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Connection> {
        self.registry.unregister(connection_id).await
    }

    /// 残りの接続数
    pub async fn count_remaining(&self) -> usize {
        self.registry.count().await
    }
}
