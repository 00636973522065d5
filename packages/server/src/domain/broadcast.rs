//! BroadcastEngine trait 定義
//!
//! イベントを接続中のクライアントへ届けるためのインターフェース。
//! 送信は受信者ごとに独立しており、一部の送信失敗がブロードキャスト全体を
//! 失敗させることはない。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, DeliveryError, OutboundEvent};

/// 接続ごとのアウトバウンドキュー（エンコード済み JSON）
pub type PusherChannel = mpsc::Sender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastEngine: Send + Sync {
    /// スナップショット内の全接続に送信（送信者自身を含む）
    ///
    /// 受理した接続数を返す。
    async fn broadcast_all(&self, event: &OutboundEvent) -> usize;

    /// `exclude` 以外の全接続に送信
    async fn broadcast_others(&self, event: &OutboundEvent, exclude: &ConnectionId) -> usize;

    /// 特定の接続にのみ送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), DeliveryError>;
}
