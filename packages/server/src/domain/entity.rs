//! エンティティとドメインイベント

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::value_object::{Color, Coordinate, Timestamp, UserId};

/// キャンバス上の 1 セル
///
/// 最初の配置で作成され、以降の配置で上書きされる。削除されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub coordinate: Coordinate,
    pub color: Color,
    /// 最後に配置したユーザー
    pub placed_by: UserId,
    /// 最後に配置された時刻
    pub placed_at: Timestamp,
}

impl Cell {
    pub fn new(coordinate: Coordinate, color: Color, placed_by: UserId, placed_at: Timestamp) -> Self {
        Self {
            coordinate,
            color,
            placed_by,
            placed_at,
        }
    }
}

/// ユーザーごとのクールダウン
///
/// 不変条件: `can_place_at = last_placed + cooldown`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownEntry {
    pub user_id: UserId,
    pub last_placed: Timestamp,
    pub can_place_at: Timestamp,
}

impl CooldownEntry {
    /// `now` に配置した場合のエントリを作成
    pub fn new(user_id: UserId, now: Timestamp, cooldown: Duration) -> Self {
        let cooldown_millis = i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX);
        Self {
            user_id,
            last_placed: now,
            can_place_at: now.add_millis(cooldown_millis),
        }
    }

    /// `now` 時点での判定
    pub fn check(&self, now: Timestamp) -> CooldownCheck {
        if now >= self.can_place_at {
            CooldownCheck::allowed()
        } else {
            let remaining = (self.can_place_at.value() - now.value()) as u64;
            CooldownCheck::denied(Duration::from_millis(remaining))
        }
    }
}

/// クールダウン判定の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownCheck {
    pub allowed: bool,
    /// 次に配置できるまでの残り時間（allowed の場合は 0）
    pub retry_after: Duration,
}

impl CooldownCheck {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after: Duration::ZERO,
        }
    }

    pub fn denied(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after,
        }
    }

    /// 表示用の残り秒数（切り捨て）
    pub fn remaining_seconds(&self) -> u64 {
        self.retry_after.as_secs()
    }
}

/// `CooldownRepository::try_acquire` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CooldownAcquisition {
    /// クールダウンを消費した
    Acquired {
        /// 書き込んだエントリ
        entry: CooldownEntry,
        /// 書き込み前のエントリ（初回配置なら None）
        previous: Option<CooldownEntry>,
    },
    /// クールダウン中のため何も書き込まなかった
    Denied { retry_after: Duration },
}

/// ピクセル配置イベント
///
/// コミット済みの配置からのみ発行され、全ビューアに配信される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelPlaced {
    pub coordinate: Coordinate,
    pub color: Color,
}
