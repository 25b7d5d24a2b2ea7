//! UseCase 層のエラー定義

use std::time::Duration;

use thiserror::Error;

use crate::domain::RepositoryError;

/// ピクセル配置のエラー
///
/// `Store` 以外はクライアント起因のエラーで、サーバー側での再試行は行わない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacePixelError {
    /// 座標がキャンバスの範囲外
    #[error("Invalid coordinates")]
    OutOfBounds { x: i64, y: i64 },

    /// パレットにない色
    #[error("Invalid color")]
    InvalidColor(String),

    /// クールダウン中
    #[error("Cooldown active. Try again in {} seconds", .retry_after.as_secs())]
    CooldownActive { retry_after: Duration },

    /// 永続化層の失敗（リクエスト単位のサーバーエラー）
    #[error("Failed to record placement: {0}")]
    Store(#[from] RepositoryError),
}
