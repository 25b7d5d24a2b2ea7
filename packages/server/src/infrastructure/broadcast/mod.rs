//! ブロードキャスト（ファンアウト）の実装
//!
//! ## 実装
//!
//! - `websocket`: WebSocket 接続ごとの送信キューを使った実装

pub mod websocket;

pub use websocket::{DEFAULT_SEND_TIMEOUT, WebSocketBroadcastHub};
