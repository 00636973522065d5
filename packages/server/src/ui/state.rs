//! Server state shared by every handler.

use std::sync::Arc;

use crate::{domain::ConnectionRegistry, usecase::SessionServices};

/// Shared application state
pub struct AppState {
    /// セッションが使うユースケース一式
    pub session_services: Arc<SessionServices>,
    /// ConnectionRegistry（ヘルスチェックでの接続数の取得に使う）
    pub registry: Arc<dyn ConnectionRegistry>,
    /// 接続ごとのアウトバウンドキューのサイズ
    pub outbound_capacity: usize,
    /// 接続ごとのインバウンドキューのサイズ
    pub inbound_capacity: usize,
}
