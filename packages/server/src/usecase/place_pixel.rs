//! UseCase: ピクセル配置処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PlacePixelUseCase::execute_at() メソッド
//! - 範囲チェック、色チェック、クールダウン、書き込み、ブロードキャストの一連の処理
//!
//! ### なぜこのテストが必要か
//! - クールダウンの消費とセルの書き込みは両方コミットされるか、どちらもされないかでなければならない
//! - 同一ユーザーの並行リクエストでクールダウンを二重に消費させない
//! - ビューアへの配信失敗で配置そのものを失敗させない
//!
//! ### どのような状況を想定しているか
//! - 正常系：配置と全ビューアへの配信
//! - 異常系：範囲外、パレット外、クールダウン中、永続化失敗
//! - 並行性：同一ユーザーの並行配置、同一座標への並行配置

use std::sync::Arc;

use tsubu_shared::time::Clock;

use crate::domain::{
    BroadcastHub, CanvasRepository, CanvasSettings, Color, CooldownAcquisition,
    CooldownRepository, Coordinate, PixelPlaced, Timestamp, UserId,
};

use super::error::PlacePixelError;

/// 配置成功時の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementReceipt {
    pub coordinate: Coordinate,
    pub color: Color,
    /// 次に配置できる時刻
    pub cooldown_until: Timestamp,
}

/// ピクセル配置のユースケース
pub struct PlacePixelUseCase {
    /// キャンバスの設定（サイズ、パレット、クールダウン）
    settings: Arc<CanvasSettings>,
    /// Canvas Repository（セルの永続化）
    canvas: Arc<dyn CanvasRepository>,
    /// Cooldown Repository（ユーザーごとのクールダウン）
    cooldowns: Arc<dyn CooldownRepository>,
    /// BroadcastHub（ビューアへの配信）
    broadcast_hub: Arc<dyn BroadcastHub>,
    /// 時刻の取得元
    clock: Arc<dyn Clock>,
}

impl PlacePixelUseCase {
    /// 新しい PlacePixelUseCase を作成
    pub fn new(
        settings: Arc<CanvasSettings>,
        canvas: Arc<dyn CanvasRepository>,
        cooldowns: Arc<dyn CooldownRepository>,
        broadcast_hub: Arc<dyn BroadcastHub>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            canvas,
            cooldowns,
            broadcast_hub,
            clock,
        }
    }

    /// 現在時刻でピクセル配置を実行
    pub async fn execute(
        &self,
        user_id: UserId,
        x: i64,
        y: i64,
        color: &str,
    ) -> Result<PlacementReceipt, PlacePixelError> {
        let now = Timestamp::new(self.clock.now_millis());
        self.execute_at(user_id, x, y, color, now).await
    }

    /// 指定した時刻でピクセル配置を実行
    ///
    /// # Arguments
    ///
    /// * `user_id` - セッションから解決済みのユーザー ID
    /// * `x`, `y` - 配置する座標（範囲チェック前）
    /// * `color` - 配置する色（パレットチェック前）
    /// * `now` - 配置時刻
    ///
    /// # Returns
    ///
    /// * `Ok(PlacementReceipt)` - 配置成功（次に配置できる時刻を含む）
    /// * `Err(PlacePixelError)` - 配置失敗（ストアとクールダウンは変更されない）
    pub async fn execute_at(
        &self,
        user_id: UserId,
        x: i64,
        y: i64,
        color: &str,
        now: Timestamp,
    ) -> Result<PlacementReceipt, PlacePixelError> {
        // 1. 範囲チェック
        let coordinate = self
            .settings
            .locate(x, y)
            .ok_or(PlacePixelError::OutOfBounds { x, y })?;

        // 2. 色チェック
        let color = self
            .settings
            .palette()
            .resolve(color)
            .ok_or_else(|| PlacePixelError::InvalidColor(color.to_string()))?;

        // 3. クールダウンの判定と更新（アトミック）
        let (entry, previous) = match self
            .cooldowns
            .try_acquire(&user_id, now, self.settings.cooldown())
            .await?
        {
            CooldownAcquisition::Acquired { entry, previous } => (entry, previous),
            CooldownAcquisition::Denied { retry_after } => {
                tracing::info!(
                    "User '{}' is on cooldown for {}s more",
                    user_id,
                    retry_after.as_secs()
                );
                return Err(PlacePixelError::CooldownActive { retry_after });
            }
        };

        // 4. セルの書き込み（失敗したらクールダウンを巻き戻す）
        if let Err(e) = self
            .canvas
            .upsert(coordinate, color.clone(), user_id.clone(), now)
            .await
        {
            tracing::error!(
                "Failed to write pixel {} for user '{}': {}",
                coordinate,
                user_id,
                e
            );
            match self.cooldowns.restore(&entry, previous).await {
                Ok(true) => tracing::debug!("Cooldown of user '{}' restored", user_id),
                Ok(false) => tracing::warn!(
                    "Cooldown of user '{}' changed concurrently, not restored",
                    user_id
                ),
                Err(restore_err) => tracing::error!(
                    "Failed to restore cooldown of user '{}': {}",
                    user_id,
                    restore_err
                ),
            }
            return Err(PlacePixelError::Store(e));
        }

        tracing::info!("User '{}' placed {} at {}", user_id, color, coordinate);

        // 5. ブロードキャスト（失敗しても配置は成功扱い）
        let event = PixelPlaced {
            coordinate,
            color: color.clone(),
        };
        let report = self.broadcast_hub.broadcast(&event).await;
        if report.dropped > 0 {
            tracing::warn!(
                "Pixel update at {} could not reach {} viewer(s)",
                coordinate,
                report.dropped
            );
        }

        // 6. 次に配置できる時刻を返す
        Ok(PlacementReceipt {
            coordinate,
            color,
            cooldown_until: entry.can_place_at,
        })
    }
}
