//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;

use super::{
    Cell, Color, CooldownAcquisition, CooldownCheck, CooldownEntry, Coordinate, RepositoryError,
    Timestamp, UserId,
};

/// キャンバス全体の状態（配置済みのセルのみ）
pub type CanvasState = HashMap<Coordinate, Color>;

/// Canvas Repository trait
///
/// 座標 → 色（と最終書き込み者）の永続的なマッピング。
///
/// ## 並行性
///
/// - 異なる座標への書き込みは互いにブロックしない
/// - 同じ座標への書き込みは直列化され、最後にコミットされたものが残る
#[async_trait]
pub trait CanvasRepository: Send + Sync {
    /// 配置済みの全セルを取得（未配置のセルは含まない）
    async fn get_full_state(&self) -> Result<CanvasState, RepositoryError>;

    /// 1 セルを取得
    async fn get_cell(&self, coordinate: Coordinate) -> Result<Option<Cell>, RepositoryError>;

    /// セルを作成または上書き
    async fn upsert(
        &self,
        coordinate: Coordinate,
        color: Color,
        user_id: UserId,
        timestamp: Timestamp,
    ) -> Result<(), RepositoryError>;
}

/// Cooldown Repository trait
///
/// ユーザーごとに「次に配置できる時刻」を管理する。
///
/// ## 並行性
///
/// - 異なるユーザーの操作は互いにブロックしない
/// - 同じユーザーの `try_acquire` は直列化され、1 つのクールダウン期間を二重に消費しない
#[async_trait]
pub trait CooldownRepository: Send + Sync {
    /// `now` 時点で配置可能か判定（読み取りのみ）
    async fn check(&self, user_id: &UserId, now: Timestamp)
    -> Result<CooldownCheck, RepositoryError>;

    /// 無条件にエントリを作成または更新
    async fn record(
        &self,
        user_id: &UserId,
        now: Timestamp,
        cooldown: Duration,
    ) -> Result<CooldownEntry, RepositoryError>;

    /// `check` と `record` をアトミックに実行
    ///
    /// `now >= can_place_at`（またはエントリなし）の場合のみ書き込む。
    async fn try_acquire(
        &self,
        user_id: &UserId,
        now: Timestamp,
        cooldown: Duration,
    ) -> Result<CooldownAcquisition, RepositoryError>;

    /// `try_acquire` で書き込んだエントリを取り消す
    ///
    /// 現在のエントリが `acquired` と一致する場合のみ `previous` に戻す（`None` なら削除）。
    /// 戻した場合は `true` を返す。
    async fn restore(
        &self,
        acquired: &CooldownEntry,
        previous: Option<CooldownEntry>,
    ) -> Result<bool, RepositoryError>;
}
