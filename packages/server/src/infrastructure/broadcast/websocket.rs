//! WebSocket を使った BroadcastHub 実装
//!
//! ## 責務
//!
//! - ビューア接続ごとの送信キュー（`ViewerChannel`）を管理
//! - ピクセル配置イベントを JSON に変換し、全ビューアへ送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、メッセージ送信に使用します。
//!
//! 登録簿は `ConnectionId` をキーとするアリーナ形式で、ID は再利用しません。
//! `broadcast` は登録簿のスナップショットをコピーしてから送信するため、
//! 送信中の `register` / `unregister` と干渉しません。

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::future::join_all;

use crate::{
    domain::{
        BroadcastHub, BroadcastReport, ConnectionId, ConnectionState, PixelPlaced, ViewerChannel,
    },
    infrastructure::dto::websocket::PixelUpdateMessage,
};

/// 1 ビューアへの送信を待つ最大時間のデフォルト
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// WebSocket を使った BroadcastHub 実装
pub struct WebSocketBroadcastHub {
    /// Open な接続
    connections: DashMap<ConnectionId, ViewerChannel>,
    /// 次に払い出す ID
    next_id: AtomicU64,
    /// 送信タイムアウト（超えたビューアは切断扱い）
    send_timeout: Duration,
}

impl WebSocketBroadcastHub {
    /// 新しい WebSocketBroadcastHub を作成
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
            send_timeout,
        }
    }

    fn snapshot(&self) -> Vec<(ConnectionId, ViewerChannel)> {
        self.connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

impl Default for WebSocketBroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_TIMEOUT)
    }
}

#[async_trait]
impl BroadcastHub for WebSocketBroadcastHub {
    async fn register(&self, channel: ViewerChannel) -> ConnectionId {
        let connection_id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.connections.insert(connection_id, channel);
        tracing::debug!("Viewer '{}' registered to BroadcastHub", connection_id);
        connection_id
    }

    async fn unregister(&self, connection_id: ConnectionId) -> bool {
        let removed = self.connections.remove(&connection_id).is_some();
        if removed {
            tracing::debug!("Viewer '{}' unregistered from BroadcastHub", connection_id);
        }
        removed
    }

    async fn broadcast(&self, event: &PixelPlaced) -> BroadcastReport {
        let payload = match serde_json::to_string(&PixelUpdateMessage::from(event)) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize pixel update: {}", e);
                return BroadcastReport::default();
            }
        };

        let targets = self.snapshot();
        let timeout = self.send_timeout;
        let sends = targets.into_iter().map(|(connection_id, sender)| {
            let payload = payload.clone();
            async move {
                let result = sender.send_timeout(payload, timeout).await;
                (connection_id, result)
            }
        });

        let mut report = BroadcastReport::default();
        for (connection_id, result) in join_all(sends).await {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    // 配信の失敗は他のビューアに影響させず、その接続だけを外す
                    tracing::warn!(
                        "Failed to push pixel update to viewer '{}': {}",
                        connection_id,
                        e
                    );
                    self.unregister(connection_id).await;
                    report.dropped += 1;
                }
            }
        }

        tracing::debug!(
            "Broadcasted pixel update at {} to {} viewer(s), dropped {}",
            event.coordinate,
            report.delivered,
            report.dropped
        );
        report
    }

    async fn connection_count(&self) -> usize {
        self.connections.len()
    }

    async fn connection_state(&self, connection_id: ConnectionId) -> ConnectionState {
        if self.connections.contains_key(&connection_id) {
            ConnectionState::Open
        } else if connection_id.value() < self.next_id.load(Ordering::SeqCst) {
            ConnectionState::Closed
        } else {
            ConnectionState::Connecting
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{Color, Coordinate};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - register / unregister / broadcast の基本動作
    // - 送信失敗（切断済み、キュー詰まり）の接続が自動的に外れること
    //
    // 【なぜこのテストが必要か】
    // - 1 ビューアの失敗が他のビューアへの配信やピクセル配置を妨げてはならない
    //
    // 【どのようなシナリオをテストするか】
    // 1. 2 接続へのブロードキャスト
    // 2. 受信側が閉じた接続の自動解除
    // 3. キューが詰まった接続のタイムアウト
    // 4. unregister の冪等性
    // 5. ブロードキャスト中の並行 register / unregister
    // ========================================

    fn event() -> PixelPlaced {
        PixelPlaced {
            coordinate: Coordinate::new(1, 2),
            color: Color::parse("#000000").unwrap(),
        }
    }

    fn expected_json() -> String {
        r##"{"type":"pixel_update","data":{"x":1,"y":2,"color":"#000000"}}"##.to_string()
    }

    #[tokio::test]
    async fn test_broadcast_to_all_connections() {
        // テスト項目: 全ての Open な接続にイベントが 1 回ずつ届く
        // given (前提条件):
        let hub = WebSocketBroadcastHub::default();
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        hub.register(tx1).await;
        hub.register(tx2).await;

        // when (操作):
        let report = hub.broadcast(&event()).await;

        // then (期待する結果):
        assert_eq!(
            report,
            BroadcastReport {
                delivered: 2,
                dropped: 0
            }
        );
        assert_eq!(rx1.recv().await, Some(expected_json()));
        assert_eq!(rx2.recv().await, Some(expected_json()));
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_drops_closed_connection() {
        // テスト項目: 受信側が閉じた接続は配信時に登録解除され、他の接続には届く
        // given (前提条件):
        let hub = WebSocketBroadcastHub::default();
        let (tx1, rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        let closed = hub.register(tx1).await;
        let alive = hub.register(tx2).await;
        drop(rx1);

        // when (操作):
        let report = hub.broadcast(&event()).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(rx2.recv().await, Some(expected_json()));
        assert_eq!(hub.connection_state(closed).await, ConnectionState::Closed);
        assert_eq!(hub.connection_state(alive).await, ConnectionState::Open);
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_broadcast_drops_stalled_connection() {
        // テスト項目: キューが詰まったままの接続はタイムアウト後に登録解除される
        // given (前提条件):
        let hub = WebSocketBroadcastHub::new(Duration::from_millis(20));
        let (tx, _rx) = mpsc::channel(1);
        tx.send("backlog".to_string()).await.unwrap();
        let stalled = hub.register(tx).await;

        // when (操作):
        let report = hub.broadcast(&event()).await;

        // then (期待する結果):
        assert_eq!(report.dropped, 1);
        assert_eq!(hub.connection_state(stalled).await, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // テスト項目: unregister を繰り返しても問題なく処理される（冪等性）
        // given (前提条件):
        let hub = WebSocketBroadcastHub::default();
        let (tx, _rx) = mpsc::channel(8);
        let connection_id = hub.register(tx).await;

        // when (操作):
        let first = hub.unregister(connection_id).await;
        let second = hub.unregister(connection_id).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_connection_ids_are_not_reused() {
        // テスト項目: 解除済みの ID は再利用されず、未発行の ID は Connecting
        let hub = WebSocketBroadcastHub::default();
        let (tx1, _rx1) = mpsc::channel(8);
        let (tx2, _rx2) = mpsc::channel(8);

        let first = hub.register(tx1).await;
        hub.unregister(first).await;
        let second = hub.register(tx2).await;

        assert_ne!(first, second);
        assert_eq!(
            hub.connection_state(ConnectionId::new(second.value() + 1))
                .await,
            ConnectionState::Connecting
        );
    }

    #[tokio::test]
    async fn test_broadcast_with_no_connections() {
        // テスト項目: 接続がなくてもエラーにならない
        let hub = WebSocketBroadcastHub::default();
        assert_eq!(hub.broadcast(&event()).await, BroadcastReport::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_unregister_during_broadcast() {
        // テスト項目: ブロードキャスト中に接続の追加・削除が並行しても壊れない
        // given (前提条件):
        let hub = Arc::new(WebSocketBroadcastHub::default());
        let (stable_tx, mut stable_rx) = mpsc::channel(256);
        hub.register(stable_tx).await;

        // when (操作):
        let churn = {
            let hub = hub.clone();
            tokio::spawn(async move {
                for _ in 0..100 {
                    let (tx, _rx) = mpsc::channel(256);
                    let id = hub.register(tx).await;
                    tokio::task::yield_now().await;
                    hub.unregister(id).await;
                }
            })
        };
        let broadcaster = {
            let hub = hub.clone();
            tokio::spawn(async move {
                for _ in 0..100 {
                    hub.broadcast(&event()).await;
                }
            })
        };
        churn.await.unwrap();
        broadcaster.await.unwrap();

        // then (期待する結果): 常に登録されていた接続は全てのイベントを受信している
        let mut received = 0;
        while stable_rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 100);
        assert_eq!(hub.connection_count().await, 1);
    }
}
