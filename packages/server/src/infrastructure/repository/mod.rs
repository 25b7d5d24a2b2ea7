//! Repository の実装
//!
//! - `inmemory`: DashMap を使ったインメモリ実装（テスト、`--in-memory` 起動用）
//! - `sqlite`: sqlx + SQLite による永続化実装

pub mod inmemory;
pub mod sqlite;

pub use inmemory::{InMemoryCanvasRepository, InMemoryCooldownRepository};
pub use sqlite::{SqliteCanvasRepository, SqliteCooldownRepository, connect_sqlite};
