//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{domain::ConnectionRegistry, usecase::SessionServices};

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// インバウンドキューのデフォルトサイズ
const DEFAULT_INBOUND_CAPACITY: usize = 64;

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(session_services, registry, 256);
/// server.run("127.0.0.1".to_string(), 4000).await?;
/// ```
pub struct Server {
    /// セッションが使うユースケース一式
    session_services: Arc<SessionServices>,
    /// ConnectionRegistry
    registry: Arc<dyn ConnectionRegistry>,
    /// 接続ごとのアウトバウンドキューのサイズ
    outbound_capacity: usize,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `session_services` - UseCases driven by each WebSocket session
    /// * `registry` - Registry of active connections
    /// * `outbound_capacity` - Per-connection outbound queue size (at least 1)
    pub fn new(
        session_services: Arc<SessionServices>,
        registry: Arc<dyn ConnectionRegistry>,
        outbound_capacity: usize,
    ) -> Self {
        Self {
            session_services,
            registry,
            outbound_capacity: outbound_capacity.max(1),
        }
    }

    /// ルーティングを組み立てる
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            session_services: self.session_services,
            registry: self.registry,
            outbound_capacity: self.outbound_capacity,
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the WebSocket chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 4000)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?token=<token>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// 既にバインド済みのリスナーでサーバーを動かす
    ///
    /// シャットダウンシグナルを受け取るまで戻らない。
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
