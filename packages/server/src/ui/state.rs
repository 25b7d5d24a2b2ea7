//! Shared application state.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::usecase::{
    ConnectViewerUseCase, DisconnectViewerUseCase, GetCanvasUseCase, GetCooldownUseCase,
    GetPaletteUseCase, PlacePixelUseCase,
};

/// Shared application state
///
/// Cloned into every handler; all fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// PlacePixelUseCase（ピクセル配置のユースケース）
    pub place_pixel_usecase: Arc<PlacePixelUseCase>,
    /// GetCanvasUseCase（キャンバス取得のユースケース）
    pub get_canvas_usecase: Arc<GetCanvasUseCase>,
    /// GetCooldownUseCase（クールダウン取得のユースケース）
    pub get_cooldown_usecase: Arc<GetCooldownUseCase>,
    /// GetPaletteUseCase（パレット取得のユースケース）
    pub get_palette_usecase: Arc<GetPaletteUseCase>,
    /// ConnectViewerUseCase（ビューア接続のユースケース）
    pub connect_viewer_usecase: Arc<ConnectViewerUseCase>,
    /// DisconnectViewerUseCase（ビューア切断のユースケース）
    pub disconnect_viewer_usecase: Arc<DisconnectViewerUseCase>,
    /// Session cookie signing key
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
