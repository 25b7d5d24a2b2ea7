//! UseCase: パレットの取得

use std::sync::Arc;

use crate::domain::{CanvasSettings, Palette};

/// パレット取得のユースケース
pub struct GetPaletteUseCase {
    settings: Arc<CanvasSettings>,
}

impl GetPaletteUseCase {
    pub fn new(settings: Arc<CanvasSettings>) -> Self {
        Self { settings }
    }

    pub fn execute(&self) -> &Palette {
        self.settings.palette()
    }
}
