//! ConnectionRegistry trait 定義
//!
//! 認証済みの接続を管理する。登録・解除・スナップショット取得は
//! 互いに排他的に行われ、ブロードキャストは常に一貫したメンバー集合を見る。

use async_trait::async_trait;

use super::{Connection, ConnectionId, Identity, PusherChannel, RegistryError};

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を登録（ACTIVE 状態で登録される）
    async fn register(
        &self,
        connection_id: ConnectionId,
        identity: Identity,
        channel: PusherChannel,
    ) -> Result<Connection, RegistryError>;

    /// 接続を解除（存在しなければ何もしない）
    ///
    /// 解除した接続を返す。
    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// ACTIVE な接続の一覧（ある時点での一貫したコピー）
    async fn snapshot(&self) -> Vec<Connection>;

    async fn get(&self, connection_id: &ConnectionId) -> Option<Connection>;

    async fn count(&self) -> usize;
}
