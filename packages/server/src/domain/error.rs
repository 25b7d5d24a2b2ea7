//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクト生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    UserIdEmpty,

    #[error("user id is too long ({0} bytes)")]
    UserIdTooLong(usize),

    #[error("invalid color format: '{0}' (expected #RRGGBB)")]
    InvalidColorFormat(String),

    #[error("canvas size must be positive (got {width}x{height})")]
    InvalidCanvasSize { width: u32, height: u32 },

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("palette contains duplicate color '{0}'")]
    DuplicateColor(String),

    #[error("cooldown must be positive")]
    InvalidCooldown,
}

/// Repository（永続化層）のエラー
///
/// クライアント起因のエラーとは異なり、リクエスト単位でサーバーエラーとして扱う。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("storage failure: {0}")]
    Storage(String),

    #[error("corrupt record: {0}")]
    CorruptRecord(String),
}
