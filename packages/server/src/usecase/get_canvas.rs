//! UseCase: キャンバス全体の取得

use std::sync::Arc;

use crate::domain::{CanvasRepository, CanvasSettings, CanvasState, RepositoryError};

/// キャンバスのスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSnapshot {
    pub width: u32,
    pub height: u32,
    /// 配置済みのセルのみ（未配置の座標は含まない）
    pub cells: CanvasState,
}

/// キャンバス全体取得のユースケース
pub struct GetCanvasUseCase {
    settings: Arc<CanvasSettings>,
    canvas: Arc<dyn CanvasRepository>,
}

impl GetCanvasUseCase {
    pub fn new(settings: Arc<CanvasSettings>, canvas: Arc<dyn CanvasRepository>) -> Self {
        Self { settings, canvas }
    }

    pub async fn execute(&self) -> Result<CanvasSnapshot, RepositoryError> {
        let cells = self.canvas.get_full_state().await?;
        Ok(CanvasSnapshot {
            width: self.settings.width(),
            height: self.settings.height(),
            cells,
        })
    }
}
