//! BroadcastEngine の実装
//!
//! - `websocket`: 接続ごとのアウトバウンドキュー経由で WebSocket に送る実装

pub mod websocket;

pub use websocket::WebSocketBroadcastEngine;
