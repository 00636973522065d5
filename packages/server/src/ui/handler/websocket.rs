//! WebSocket connection handlers.
//!
//! 1 つの接続につき 3 つのタスクが動く:
//! - reader: フレームを受信・デコードしてインバウンドキューに積む
//! - session: インバウンドキューを到着順に処理する（SessionHandler）
//! - pusher: アウトバウンドキューの内容をソケットに書き出す

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::{HeaderMap, header::AUTHORIZATION},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, InboundEvent, OutboundEvent},
    infrastructure::dto::conversion::{decode_event, encode_event},
    ui::state::AppState,
    usecase::{HandshakeError, SessionHandler},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    // クエリパラメータを優先し、なければ Authorization ヘッダーを見る
    let token = query.token.or_else(|| bearer_token(&headers));
    ws.on_upgrade(move |socket| handle_socket(socket, state, token))
}

/// `Authorization: Bearer <token>` からトークンを取り出す
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, token: Option<String>) {
    let connection_id = ConnectionIdFactory::generate();
    let (mut sender, receiver) = socket.split();
    let (tx, rx) = mpsc::channel(state.outbound_capacity);

    let mut session = SessionHandler::new(connection_id.clone(), state.session_services.clone());
    if let Err(e) = session.handshake(token.as_deref(), tx).await {
        reject(&mut sender, &e).await;
        return;
    }

    let (inbound_tx, inbound_rx) = mpsc::channel(state.inbound_capacity);

    // previous messages は既に rx に積まれているので、pusher が最初に送る
    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = reader_loop(receiver, inbound_tx, connection_id.clone());
    let session_task = tokio::spawn(session.run(inbound_rx));

    // If any one of the tasks completes, stop reading
    tokio::select! {
        _ = &mut recv_task => {},
        _ = &mut send_task => recv_task.abort(),
    };

    // インバウンドキューが閉じると session は残りのイベントを処理してから切断処理を行う
    if let Err(e) = session_task.await {
        tracing::error!("Session task for '{}' failed: {}", connection_id, e);
    }
    send_task.abort();
}

/// ハンドシェイク失敗を通知してソケットを閉じる
async fn reject(sender: &mut SplitSink<WebSocket, Message>, error: &HandshakeError) {
    let message = error.client_message();
    match encode_event(&OutboundEvent::ConnectError {
        message: message.clone(),
    }) {
        Ok(json) => {
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                tracing::debug!("Failed to send connect error: {}", e);
                return;
            }
        }
        Err(e) => tracing::error!("Failed to encode connect error: {}", e),
    }

    let close = Message::Close(Some(CloseFrame {
        code: close_code::POLICY,
        reason: message.into(),
    }));
    if let Err(e) = sender.send(close).await {
        tracing::debug!("Failed to send close frame: {}", e);
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// The task ends when the channel is closed (the connection was unregistered) or the socket
/// can no longer be written to.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Spawns a task that decodes client frames and feeds them to the session in arrival order.
///
/// Dropping `inbound` when the socket closes lets the session finish and disconnect.
fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    inbound: mpsc::Sender<InboundEvent>,
    connection_id: ConnectionId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match decode_event(text.as_str()) {
                    Ok(event) => {
                        if inbound.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring malformed frame from '{}': {}", connection_id, e);
                    }
                },
                Message::Close(_) => {
                    tracing::debug!("Client '{}' requested close", connection_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    })
}
