//! ドメイン層
//!
//! キャンバス、クールダウン、ビューア接続に関するドメインモデルと、
//! ドメイン層が必要とするインターフェース（Repository, BroadcastHub）を定義します。

pub mod broadcast;
pub mod entity;
pub mod error;
pub mod repository;
pub mod settings;
pub mod value_object;

pub use broadcast::{BroadcastHub, BroadcastReport, ConnectionState, ViewerChannel};
pub use entity::{Cell, CooldownAcquisition, CooldownCheck, CooldownEntry, PixelPlaced};
pub use error::{RepositoryError, ValueObjectError};
pub use repository::{CanvasRepository, CanvasState, CooldownRepository};
pub use settings::{CanvasSettings, DEFAULT_PALETTE, Palette};
pub use value_object::{Color, ConnectionId, Coordinate, Timestamp, UserId, UserIdFactory};
