//! UseCase: ビューア接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectViewerUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 登録されたビューアだけがピクセル配置イベントを受け取る

use std::sync::Arc;

use crate::domain::{BroadcastHub, ConnectionId, ViewerChannel};

/// ビューア接続のユースケース
pub struct ConnectViewerUseCase {
    /// BroadcastHub（ビューアへの配信の抽象化）
    broadcast_hub: Arc<dyn BroadcastHub>,
}

impl ConnectViewerUseCase {
    /// 新しい ConnectViewerUseCase を作成
    pub fn new(broadcast_hub: Arc<dyn BroadcastHub>) -> Self {
        Self { broadcast_hub }
    }

    /// ビューア接続を実行
    ///
    /// # Arguments
    ///
    /// * `channel` - ビューアへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// 登録された接続のハンドル
    pub async fn execute(&self, channel: ViewerChannel) -> ConnectionId {
        let connection_id = self.broadcast_hub.register(channel).await;
        tracing::info!(
            "Viewer '{}' connected ({} viewer(s) online)",
            connection_id,
            self.broadcast_hub.connection_count().await
        );
        connection_id
    }
}
