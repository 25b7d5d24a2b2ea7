//! UseCase: ビューア切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectViewerUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：ビューアの切断
//! - エッジケース：配信失敗で既に外れているビューアの切断（冪等）

use std::sync::Arc;

use crate::domain::{BroadcastHub, ConnectionId};

/// ビューア切断のユースケース
pub struct DisconnectViewerUseCase {
    /// BroadcastHub（ビューアへの配信の抽象化）
    broadcast_hub: Arc<dyn BroadcastHub>,
}

impl DisconnectViewerUseCase {
    /// 新しい DisconnectViewerUseCase を作成
    pub fn new(broadcast_hub: Arc<dyn BroadcastHub>) -> Self {
        Self { broadcast_hub }
    }

    /// ビューア切断を実行
    ///
    /// # Returns
    ///
    /// この呼び出しで登録解除した場合は `true`（既に解除済みなら `false`）
    pub async fn execute(&self, connection_id: ConnectionId) -> bool {
        let removed = self.broadcast_hub.unregister(connection_id).await;
        tracing::info!(
            "Viewer '{}' disconnected ({} viewer(s) online)",
            connection_id,
            self.count_remaining_viewers().await
        );
        removed
    }

    /// 残りのビューア数を取得
    pub async fn count_remaining_viewers(&self) -> usize {
        self.broadcast_hub.connection_count().await
    }
}
