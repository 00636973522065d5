//! Repository trait 定義
//!
//! ドメイン層が必要とするメッセージ保存のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ChatMessage, StorageError, StoredMessage};

/// ハンドシェイク直後に送る履歴の件数
pub const DEFAULT_BACKFILL_LIMIT: usize = 50;

/// Message Store trait
///
/// 挿入順に並んだ追記専用のメッセージログ。
///
/// ## 不変条件
///
/// - `created_at` は挿入順に対して単調非減少
/// - `recent` は最新 `limit` 件を古い順で返す
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// メッセージを保存し、ID と作成時刻を割り当てる
    async fn append(&self, message: ChatMessage) -> Result<StoredMessage, StorageError>;

    /// 最新 `limit` 件を古い順で取得
    async fn recent(&self, limit: usize) -> Result<Vec<StoredMessage>, StorageError>;

    /// 全メッセージを削除し、削除件数を返す
    async fn clear_all(&self) -> Result<usize, StorageError>;
}
