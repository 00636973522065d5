//! Test fixtures shared by the use case tests.

use std::sync::Arc;

use hiroba_shared::time::SystemClock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        AuthService, ConnectionId, ConnectionIdFactory, ConnectionRegistry, DisplayName, Identity,
        UserId,
    },
    infrastructure::{
        auth::{JwtAuthService, jwt::DEFAULT_TOKEN_TTL},
        broadcast::WebSocketBroadcastEngine,
        registry::InMemoryConnectionRegistry,
        repository::InMemoryMessageStore,
    },
};

pub const TEST_SECRET: &str = "test-secret";

/// Real in-memory infrastructure wired together
pub struct Fixture {
    pub store: Arc<InMemoryMessageStore>,
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub broadcast: Arc<WebSocketBroadcastEngine>,
    pub auth: Arc<JwtAuthService>,
}

impl Fixture {
    pub fn new() -> Self {
        let registry = Arc::new(InMemoryConnectionRegistry::new(Arc::new(SystemClock)));
        Self {
            store: Arc::new(InMemoryMessageStore::new(Arc::new(SystemClock))),
            broadcast: Arc::new(WebSocketBroadcastEngine::new(registry.clone())),
            registry,
            auth: Arc::new(JwtAuthService::new(
                TEST_SECRET,
                DEFAULT_TOKEN_TTL,
                Arc::new(SystemClock),
            )),
        }
    }

    /// Register a connection directly, skipping the handshake
    pub async fn connect(&self, name: &str) -> (ConnectionId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(64);
        let id = ConnectionIdFactory::generate();
        self.registry
            .register(id.clone(), identity(name), tx)
            .await
            .unwrap();
        (id, rx)
    }

    pub fn token(&self, name: &str) -> String {
        self.auth.issue(&identity(name)).unwrap().into_string()
    }
}

pub fn identity(name: &str) -> Identity {
    Identity::new(
        UserId::new(format!("user-{name}")).unwrap(),
        DisplayName::new(name.to_string()).unwrap(),
    )
}

pub fn display_name(name: &str) -> DisplayName {
    DisplayName::new(name.to_string()).unwrap()
}

/// Next queued frame, decoded
pub async fn recv_json(rx: &mut mpsc::Receiver<String>) -> serde_json::Value {
    let frame = rx.recv().await.expect("channel closed");
    serde_json::from_str(&frame).expect("frame is not JSON")
}

/// Decoded frames currently queued, without waiting
pub fn drain_json(rx: &mut mpsc::Receiver<String>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).expect("frame is not JSON"));
    }
    frames
}
