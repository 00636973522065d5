//! SessionHandler: 接続ごとの状態機械
//!
//! ```text
//! HANDSHAKING ──(トークン検証成功)──> ACTIVE ──(切断)──> CLOSED
//!      └────────────(検証失敗 / 切断)────────────────────────┘
//! ```
//!
//! 1 接続につき 1 つの SessionHandler が専用タスクで動き、インバウンドの
//! イベントを到着順に 1 つずつ処理します。処理中の操作は切断後も最後まで
//! 実行され、その結果のブロードキャストは実行時点のスナップショットに
//! 対して行われます（閉じた接続は含まれない）。
//!
//! トークンの有効期限はハンドシェイク時にのみ確認する。

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{
    ConnectionId, ConnectionState, Identity, InboundEvent, PusherChannel, TypingKind,
    ValueObjectError,
};

use super::{
    ClearHistoryUseCase, ConnectSessionUseCase, DisconnectSessionUseCase, RelayTypingUseCase,
    SendMessageUseCase,
    error::{HandshakeError, SendMessageError},
};

/// セッションが使うユースケース一式（全接続で共有）
pub struct SessionServices {
    pub connect: Arc<ConnectSessionUseCase>,
    pub send_message: Arc<SendMessageUseCase>,
    pub relay_typing: Arc<RelayTypingUseCase>,
    pub clear_history: Arc<ClearHistoryUseCase>,
    pub disconnect: Arc<DisconnectSessionUseCase>,
}

enum SessionState {
    Handshaking,
    Active(Identity),
    Closed,
}

/// 1 接続分のセッション
pub struct SessionHandler {
    connection_id: ConnectionId,
    state: SessionState,
    services: Arc<SessionServices>,
}

impl SessionHandler {
    pub fn new(connection_id: ConnectionId, services: Arc<SessionServices>) -> Self {
        Self {
            connection_id,
            state: SessionState::Handshaking,
            services,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn state(&self) -> ConnectionState {
        match self.state {
            SessionState::Handshaking => ConnectionState::Handshaking,
            SessionState::Active(_) => ConnectionState::Active,
            SessionState::Closed => ConnectionState::Closed,
        }
    }

    /// ハンドシェイクを行い、成功したら ACTIVE に遷移してバックフィルを送る
    ///
    /// 失敗した場合は CLOSED に遷移する。接続はレジストリに登録されない。
    pub async fn handshake(
        &mut self,
        token: Option<&str>,
        channel: PusherChannel,
    ) -> Result<(), HandshakeError> {
        if !matches!(self.state, SessionState::Handshaking) {
            return Err(HandshakeError::NotHandshaking);
        }

        let identity = match self
            .services
            .connect
            .execute(self.connection_id.clone(), token, channel)
            .await
        {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!("Handshake failed for '{}': {}", self.connection_id, e);
                self.state = SessionState::Closed;
                return Err(e);
            }
        };

        tracing::info!(
            "{} connected ({})",
            identity.display_name,
            self.connection_id
        );
        self.state = SessionState::Active(identity);
        self.services.connect.backfill(&self.connection_id).await;

        Ok(())
    }

    /// インバウンドイベントを 1 つ処理する
    ///
    /// ACTIVE 以外の状態では何もしない。
    pub async fn handle(&mut self, event: InboundEvent) {
        let SessionState::Active(identity) = &self.state else {
            tracing::debug!(
                "Ignoring event from '{}' outside of an active session",
                self.connection_id
            );
            return;
        };
        let author = &identity.display_name;

        match event {
            InboundEvent::Message { text } => {
                match self
                    .services
                    .send_message
                    .execute(&self.connection_id, author, text)
                    .await
                {
                    Ok(_) => {}
                    Err(SendMessageError::Validation(ValueObjectError::EmptyMessageText)) => {
                        tracing::debug!("Dropped empty message from '{}'", self.connection_id);
                    }
                    Err(e) => {
                        // 送信者には通知しない
                        tracing::error!("Save message error: {}", e);
                    }
                }
            }
            InboundEvent::Typing => {
                self.services
                    .relay_typing
                    .execute(&self.connection_id, author, TypingKind::Started)
                    .await;
            }
            InboundEvent::StopTyping => {
                self.services
                    .relay_typing
                    .execute(&self.connection_id, author, TypingKind::Stopped)
                    .await;
            }
            InboundEvent::ClearHistory => {
                // 失敗は要求者に通知済み
                let _ = self
                    .services
                    .clear_history
                    .execute(&self.connection_id, author)
                    .await;
            }
        }
    }

    /// CLOSED に遷移し、レジストリから取り除く
    pub async fn close(&mut self) {
        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        if let SessionState::Active(identity) = previous {
            self.services.disconnect.execute(&self.connection_id).await;
            tracing::info!(
                "{} disconnected ({}), {} connections remaining",
                identity.display_name,
                self.connection_id,
                self.services.disconnect.count_remaining().await
            );
        }
    }

    /// インバウンドキューが閉じるまでイベントを到着順に処理し、最後に切断処理を行う
    pub async fn run(mut self, mut inbound: mpsc::Receiver<InboundEvent>) {
        while let Some(event) = inbound.recv().await {
            self.handle(event).await;
        }
        self.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ConnectionIdFactory, ConnectionRegistry, DEFAULT_BACKFILL_LIMIT, MessageStore,
            StorageError, repository::MockMessageStore,
        },
        usecase::{
            CLEAR_HISTORY_ERROR_MESSAGE,
            test_support::{Fixture, drain_json, recv_json},
        },
    };
    use std::time::Duration;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - SessionHandler の状態遷移とイベント処理
    //
    // 【なぜこのテストが必要か】
    // - HANDSHAKING 中はイベントを処理しないことを保証する
    // - ハンドシェイク・メッセージ・typing・履歴削除・切断の一連の流れを確認する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 有効なトークンで ACTIVE になり、バックフィルを受け取る
    // 2. 不正なトークンでは CLOSED になり、レジストリにも入らない
    // 3. A / B / C のエンドツーエンドシナリオ
    // 4. 空のメッセージは破棄される
    // 5. 保存失敗時は誰にも届かず、セッションは継続する
    // 6. 履歴削除の失敗は要求者にだけ届く
    // ========================================

    fn services_with_store(fixture: &Fixture, store: Arc<dyn MessageStore>) -> Arc<SessionServices> {
        Arc::new(SessionServices {
            connect: Arc::new(ConnectSessionUseCase::new(
                fixture.auth.clone(),
                fixture.registry.clone(),
                store.clone(),
                fixture.broadcast.clone(),
                Duration::from_secs(1),
                DEFAULT_BACKFILL_LIMIT,
            )),
            send_message: Arc::new(SendMessageUseCase::new(
                store.clone(),
                fixture.broadcast.clone(),
            )),
            relay_typing: Arc::new(RelayTypingUseCase::new(fixture.broadcast.clone())),
            clear_history: Arc::new(ClearHistoryUseCase::new(store, fixture.broadcast.clone())),
            disconnect: Arc::new(DisconnectSessionUseCase::new(fixture.registry.clone())),
        })
    }

    fn create_services(fixture: &Fixture) -> Arc<SessionServices> {
        services_with_store(fixture, fixture.store.clone())
    }

    /// Handshake a new session and return it with its outbound queue
    async fn open_session(
        fixture: &Fixture,
        services: &Arc<SessionServices>,
        name: &str,
    ) -> (SessionHandler, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(64);
        let mut session = SessionHandler::new(ConnectionIdFactory::generate(), services.clone());
        let token = fixture.token(name);
        session.handshake(Some(&token), tx).await.unwrap();
        (session, rx)
    }

    fn message(text: &str) -> InboundEvent {
        InboundEvent::Message {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_handshake_with_valid_token_becomes_active() {
        // テスト項目: 有効なトークンで ACTIVE になり、バックフィルを受け取る
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);

        // when (操作):
        let (session, mut rx) = open_session(&fixture, &services, "alice").await;

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::Active);
        let frame = recv_json(&mut rx).await;
        assert_eq!(frame["type"], "previous messages");
        assert!(fixture.registry.get(session.connection_id()).await.is_some());
    }

    #[tokio::test]
    async fn test_handshake_with_invalid_token_closes_session() {
        // テスト項目: 不正なトークンでは CLOSED になり、バックフィルも届かない
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (tx, mut rx) = mpsc::channel(64);
        let mut session = SessionHandler::new(ConnectionIdFactory::generate(), services);

        // when (操作):
        let result = session.handshake(Some("expired.or.malformed"), tx).await;

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(session.state(), ConnectionState::Closed);
        assert!(fixture.registry.snapshot().await.is_empty());
        assert!(drain_json(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_handshake_twice_is_rejected() {
        // テスト項目: ACTIVE なセッションで再度ハンドシェイクはできない
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (mut session, _rx) = open_session(&fixture, &services, "alice").await;
        let (tx, _rx2) = mpsc::channel(8);
        let token = fixture.token("mallory");

        // when (操作):
        let result = session.handshake(Some(&token), tx).await;

        // then (期待する結果):
        assert_eq!(result, Err(HandshakeError::NotHandshaking));
        assert_eq!(session.state(), ConnectionState::Active);
        assert_eq!(fixture.registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_events_before_handshake_are_ignored() {
        // テスト項目: HANDSHAKING 中のイベントは処理されない
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (_bob, mut bob_rx) = fixture.connect("bob").await;
        let mut session = SessionHandler::new(ConnectionIdFactory::generate(), services);

        // when (操作):
        session.handle(message("sneaky")).await;
        session.handle(InboundEvent::Typing).await;

        // then (期待する結果):
        assert_eq!(session.state(), ConnectionState::Handshaking);
        assert!(fixture.store.is_empty().await);
        assert!(drain_json(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        // テスト項目: A と B が接続し、A が送信・切断、B が送信、C の履歴が [hi, bye]
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (mut a, mut a_rx) = open_session(&fixture, &services, "alice").await;
        let (mut b, mut b_rx) = open_session(&fixture, &services, "bob").await;
        drain_json(&mut a_rx);
        drain_json(&mut b_rx);

        // when (操作):
        a.handle(message("hi")).await;

        // then (期待する結果): A と B の両方に届く
        for rx in [&mut a_rx, &mut b_rx] {
            let frame = recv_json(rx).await;
            assert_eq!(frame["type"], "message");
            assert_eq!(frame["text"], "hi");
            assert_eq!(frame["author"], "alice");
        }

        // when (操作): A が切断し、B が送信
        a.close().await;
        b.handle(message("bye")).await;

        // then (期待する結果): B は自分のメッセージを受け取り、A には届かない
        let frame = recv_json(&mut b_rx).await;
        assert_eq!(frame["text"], "bye");
        assert_eq!(frame["author"], "bob");
        assert!(drain_json(&mut a_rx).is_empty());

        // when (操作): C が接続
        let (_c, mut c_rx) = open_session(&fixture, &services, "charlie").await;

        // then (期待する結果):
        let backfill = recv_json(&mut c_rx).await;
        assert_eq!(backfill["type"], "previous messages");
        let messages = backfill["messages"].as_array().unwrap();
        let pairs: Vec<(&str, &str)> = messages
            .iter()
            .map(|m| (m["text"].as_str().unwrap(), m["author"].as_str().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("hi", "alice"), ("bye", "bob")]);
    }

    #[tokio::test]
    async fn test_backfill_contains_last_fifty_messages() {
        // テスト項目: 60 件送信後の新規接続には最後の 50 件が古い順で届く
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (mut a, _a_rx) = open_session(&fixture, &services, "alice").await;
        for i in 0..60 {
            a.handle(message(&format!("m{i}"))).await;
        }

        // when (操作):
        let (_b, mut b_rx) = open_session(&fixture, &services, "bob").await;

        // then (期待する結果):
        let backfill = recv_json(&mut b_rx).await;
        let texts: Vec<&str> = backfill["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap())
            .collect();
        let expected: Vec<String> = (10..60).map(|i| format!("m{i}")).collect();
        assert_eq!(texts, expected);
    }

    #[tokio::test]
    async fn test_empty_message_is_dropped() {
        // テスト項目: 空白のみのメッセージは保存もブロードキャストもされない
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (mut a, mut a_rx) = open_session(&fixture, &services, "alice").await;
        drain_json(&mut a_rx);

        // when (操作):
        a.handle(message("   ")).await;

        // then (期待する結果): セッションは ACTIVE のまま
        assert!(fixture.store.is_empty().await);
        assert!(drain_json(&mut a_rx).is_empty());
        assert_eq!(a.state(), ConnectionState::Active);
    }

    #[tokio::test]
    async fn test_typing_is_relayed_to_others_only() {
        // テスト項目: typing は送信者以外にだけ届く
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (mut a, mut a_rx) = open_session(&fixture, &services, "alice").await;
        let (_b, mut b_rx) = open_session(&fixture, &services, "bob").await;
        drain_json(&mut a_rx);
        drain_json(&mut b_rx);

        // when (操作):
        a.handle(InboundEvent::Typing).await;
        a.handle(InboundEvent::StopTyping).await;

        // then (期待する結果):
        let frames = drain_json(&mut b_rx);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], serde_json::json!({"type": "typing", "author": "alice"}));
        assert_eq!(
            frames[1],
            serde_json::json!({"type": "stop typing", "author": "alice"})
        );
        assert!(drain_json(&mut a_rx).is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_on_message_is_silent() {
        // テスト項目: 保存に失敗したメッセージは誰にも届かず、セッションは継続する
        // given (前提条件):
        let fixture = Fixture::new();
        let mut store = MockMessageStore::new();
        store.expect_recent().returning(|_| Ok(Vec::new()));
        store
            .expect_append()
            .returning(|_| Err(StorageError::Unavailable("down".to_string())));
        let services = services_with_store(&fixture, Arc::new(store));
        let (mut a, mut a_rx) = open_session(&fixture, &services, "alice").await;
        let (_b, mut b_rx) = open_session(&fixture, &services, "bob").await;
        drain_json(&mut a_rx);
        drain_json(&mut b_rx);

        // when (操作):
        a.handle(message("lost")).await;
        a.handle(InboundEvent::Typing).await;

        // then (期待する結果): 後続のイベントは処理される
        assert!(drain_json(&mut a_rx).is_empty());
        let frames = drain_json(&mut b_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "typing");
        assert_eq!(a.state(), ConnectionState::Active);
    }

    #[tokio::test]
    async fn test_clear_history_then_backfill_is_empty() {
        // テスト項目: 履歴削除後の新規接続のバックフィルは空
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (mut a, mut a_rx) = open_session(&fixture, &services, "alice").await;
        a.handle(message("one")).await;
        a.handle(message("two")).await;
        drain_json(&mut a_rx);

        // when (操作):
        a.handle(InboundEvent::ClearHistory).await;
        a.handle(InboundEvent::ClearHistory).await;

        // then (期待する結果):
        let frames = drain_json(&mut a_rx);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f["type"] == "history cleared"));
        let (_b, mut b_rx) = open_session(&fixture, &services, "bob").await;
        let backfill = recv_json(&mut b_rx).await;
        assert_eq!(backfill["messages"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_clear_history_failure_reaches_requester_only() {
        // テスト項目: 履歴削除の失敗は要求者にだけ届き、他の接続は影響を受けない
        // given (前提条件):
        let fixture = Fixture::new();
        let mut store = MockMessageStore::new();
        store.expect_recent().returning(|_| Ok(Vec::new()));
        store
            .expect_clear_all()
            .returning(|| Err(StorageError::Unavailable("down".to_string())));
        let services = services_with_store(&fixture, Arc::new(store));
        let (mut a, mut a_rx) = open_session(&fixture, &services, "alice").await;
        let (_b, mut b_rx) = open_session(&fixture, &services, "bob").await;
        drain_json(&mut a_rx);
        drain_json(&mut b_rx);

        // when (操作):
        a.handle(InboundEvent::ClearHistory).await;

        // then (期待する結果):
        let frame = recv_json(&mut a_rx).await;
        assert_eq!(frame["type"], "clear history error");
        assert_eq!(frame["message"], CLEAR_HISTORY_ERROR_MESSAGE);
        assert!(drain_json(&mut b_rx).is_empty());
        assert_eq!(fixture.registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_run_processes_events_in_order_then_closes() {
        // テスト項目: run はイベントを到着順に処理し、キューが閉じたら切断処理を行う
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (a, mut a_rx) = open_session(&fixture, &services, "alice").await;
        let connection_id = a.connection_id().clone();
        drain_json(&mut a_rx);
        let (inbound_tx, inbound_rx) = mpsc::channel(16);

        // when (操作):
        for text in ["first", "second", "third"] {
            inbound_tx.send(message(text)).await.unwrap();
        }
        drop(inbound_tx);
        a.run(inbound_rx).await;

        // then (期待する結果):
        let texts: Vec<String> = drain_json(&mut a_rx)
            .iter()
            .map(|f| f["text"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert!(fixture.registry.get(&connection_id).await.is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        // テスト項目: close を 2 回呼んでも問題ない
        // given (前提条件):
        let fixture = Fixture::new();
        let services = create_services(&fixture);
        let (mut a, _a_rx) = open_session(&fixture, &services, "alice").await;

        // when (操作):
        a.close().await;
        a.close().await;

        // then (期待する結果):
        assert_eq!(a.state(), ConnectionState::Closed);
        assert_eq!(fixture.registry.count().await, 0);
    }
}
