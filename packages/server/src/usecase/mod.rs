//! UseCase 層
//!
//! ドメイン層のインターフェース（Repository, BroadcastHub）を組み合わせて
//! アプリケーションの操作を実現します。

mod connect_viewer;
mod disconnect_viewer;
mod error;
mod get_canvas;
mod get_cooldown;
mod get_palette;
mod place_pixel;

pub use connect_viewer::ConnectViewerUseCase;
pub use disconnect_viewer::DisconnectViewerUseCase;
pub use error::PlacePixelError;
pub use get_canvas::{CanvasSnapshot, GetCanvasUseCase};
pub use get_cooldown::GetCooldownUseCase;
pub use get_palette::GetPaletteUseCase;
pub use place_pixel::{PlacePixelUseCase, PlacementReceipt};
