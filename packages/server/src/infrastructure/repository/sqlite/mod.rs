//! SQLite Repository 実装
//!
//! sqlx の SQLite ドライバを使った永続化実装。
//!
//! ```text
//! pixels         (x, y) PRIMARY KEY  -> 1 座標 1 レコード
//! user_cooldowns user_id PRIMARY KEY -> 1 ユーザー 1 レコード
//! ```
//!
//! 時刻は全て Unix ミリ秒（UTC）の INTEGER で保存します。

mod canvas;
mod cooldown;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::domain::RepositoryError;

pub use canvas::SqliteCanvasRepository;
pub use cooldown::SqliteCooldownRepository;

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}

/// SQLite に接続し、スキーマを作成する
///
/// # Arguments
///
/// * `database_url` - 例: `sqlite://tsubu.db`, `sqlite::memory:`
/// * `max_connections` - プールの最大接続数（`sqlite::memory:` では 1 にすること）
pub async fn connect_sqlite(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    tracing::info!("SQLite store ready at '{}'", database_url);

    Ok(pool)
}

/// スキーマを作成（既に存在する場合は何もしない）
pub async fn init_schema(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pixels (
            x INTEGER NOT NULL,
            y INTEGER NOT NULL,
            color TEXT NOT NULL,
            user_id TEXT NOT NULL,
            placed_at INTEGER NOT NULL,
            PRIMARY KEY (x, y)
        );

        CREATE TABLE IF NOT EXISTS user_cooldowns (
            user_id TEXT PRIMARY KEY,
            last_placed INTEGER NOT NULL,
            can_place_at INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    connect_sqlite("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory SQLite")
}
