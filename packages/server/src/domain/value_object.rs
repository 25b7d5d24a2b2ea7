//! 値オブジェクト
//!
//! 生成時にバリデーションを行い、不正な値が存在できないようにします。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// UserId の最大長
pub const USER_ID_MAX_LENGTH: usize = 64;

/// ユーザー ID
///
/// セッションから解決された不透明な識別子。空文字列は許可しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// 新しい UserId を作成
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::UserIdEmpty);
        }
        if value.len() > USER_ID_MAX_LENGTH {
            return Err(ValueObjectError::UserIdTooLong(value.len()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// UserId の生成器
pub struct UserIdFactory;

impl UserIdFactory {
    /// UUID v4 から新しい UserId を生成
    pub fn generate() -> UserId {
        UserId(uuid::Uuid::new_v4().to_string())
    }
}

/// キャンバス上の座標
///
/// 範囲チェックは `CanvasSettings::locate` が行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: u32,
    y: u32,
}

impl Coordinate {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    /// `"x,y"` 形式のキー
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// `#RRGGBB` 形式の色
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(String);

impl Color {
    /// `#RRGGBB` 形式の文字列から Color を作成
    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        let valid = value.len() == 7
            && value.starts_with('#')
            && value[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ValueObjectError::InvalidColorFormat(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix タイムスタンプ（UTC, ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `millis` ミリ秒後のタイムスタンプ
    pub fn add_millis(&self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

/// ビューア接続のハンドル
///
/// BroadcastHub が払い出す単調増加の ID。再利用されない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
