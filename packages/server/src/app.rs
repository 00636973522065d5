//! Dependency wiring.
//!
//! Builds the in-memory adapters, the UseCases and the [`Server`] from a
//! [`ServerConfig`]. Used by the binary and by the integration tests.

use std::sync::Arc;

use hiroba_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    domain::{AuthService, BroadcastEngine, ConnectionRegistry, MessageStore},
    infrastructure::{
        auth::JwtAuthService, broadcast::WebSocketBroadcastEngine,
        registry::InMemoryConnectionRegistry, repository::InMemoryMessageStore,
    },
    ui::Server,
    usecase::{
        ClearHistoryUseCase, ConnectSessionUseCase, DisconnectSessionUseCase, RelayTypingUseCase,
        SendMessageUseCase, SessionServices,
    },
};

/// 組み立て済みのアプリケーション
pub struct App {
    pub server: Server,
    /// トークンの発行・検証（サーバーと同じ秘密鍵を使う）
    pub auth: Arc<dyn AuthService>,
}

impl App {
    /// Initialize dependencies in order:
    /// 1. Clock
    /// 2. MessageStore / ConnectionRegistry
    /// 3. BroadcastEngine / AuthService
    /// 4. UseCases
    /// 5. Server
    pub fn build(config: &ServerConfig) -> Self {
        // 1. Clock
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 2. In-memory storage
        let store: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::new(clock.clone()));
        let registry: Arc<dyn ConnectionRegistry> =
            Arc::new(InMemoryConnectionRegistry::new(clock.clone()));

        // 3. Broadcast (WebSocket implementation) and JWT auth
        let broadcast: Arc<dyn BroadcastEngine> =
            Arc::new(WebSocketBroadcastEngine::new(registry.clone()));
        let auth: Arc<dyn AuthService> = Arc::new(JwtAuthService::new(
            &config.jwt_secret,
            config.token_ttl(),
            clock,
        ));

        // 4. UseCases
        let session_services = Arc::new(SessionServices {
            connect: Arc::new(ConnectSessionUseCase::new(
                auth.clone(),
                registry.clone(),
                store.clone(),
                broadcast.clone(),
                config.handshake_timeout(),
                config.backfill_limit,
            )),
            send_message: Arc::new(SendMessageUseCase::new(store.clone(), broadcast.clone())),
            relay_typing: Arc::new(RelayTypingUseCase::new(broadcast.clone())),
            clear_history: Arc::new(ClearHistoryUseCase::new(store, broadcast)),
            disconnect: Arc::new(DisconnectSessionUseCase::new(registry.clone())),
        });

        // 5. Server
        let server = Server::new(session_services, registry, config.outbound_capacity);

        Self { server, auth }
    }
}
