//! BroadcastHub trait 定義
//!
//! ビューア接続の登録・解除と、ピクセル配置イベントのファンアウトを抽象化します。
//! WebSocket などの具体的な実装は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, PixelPlaced};

/// ビューアへ送信するためのチャンネル
///
/// 容量付き。詰まったビューアは送信タイムアウト後に切断扱いになる。
pub type ViewerChannel = mpsc::Sender<String>;

/// ビューア接続の状態
///
/// `Connecting -> Open -> Closed` の順にのみ遷移する（`Closed` は終端）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// ハンドシェイク中（まだ登録されていない）
    Connecting,
    /// 登録済みで配信対象
    Open,
    /// 登録解除済み
    Closed,
}

/// ブロードキャストの結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 送信できた接続数
    pub delivered: usize,
    /// 送信に失敗し登録解除した接続数
    pub dropped: usize,
}

/// Broadcast Hub trait
///
/// ## 不変条件
///
/// - `broadcast` は呼び出し時点で Open な接続のスナップショットに送信する
/// - 1 接続の送信失敗は他の接続への配信を妨げず、その接続を `unregister` する
/// - `unregister` は冪等
#[async_trait]
pub trait BroadcastHub: Send + Sync {
    /// 接続を登録し、Open にする
    async fn register(&self, channel: ViewerChannel) -> ConnectionId;

    /// 接続を登録解除し、Closed にする
    ///
    /// 登録されていた場合は `true`
    async fn unregister(&self, connection_id: ConnectionId) -> bool;

    /// 全ての Open な接続にイベントを送信
    async fn broadcast(&self, event: &PixelPlaced) -> BroadcastReport;

    /// Open な接続数
    async fn connection_count(&self) -> usize;

    /// 接続の状態
    async fn connection_state(&self, connection_id: ConnectionId) -> ConnectionState;
}
