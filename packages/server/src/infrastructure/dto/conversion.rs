//! Conversion logic between DTOs and domain entities.

use crate::domain::{CooldownCheck, Palette, PixelPlaced};
use crate::infrastructure::dto::{http, websocket as ws};
use crate::usecase::CanvasSnapshot;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&PixelPlaced> for ws::PixelUpdateMessage {
    fn from(event: &PixelPlaced) -> Self {
        Self {
            r#type: ws::MessageType::PixelUpdate,
            data: ws::PixelUpdateData {
                x: event.coordinate.x(),
                y: event.coordinate.y(),
                color: event.color.as_str().to_string(),
            },
        }
    }
}

impl From<CanvasSnapshot> for http::CanvasDto {
    fn from(snapshot: CanvasSnapshot) -> Self {
        Self {
            width: snapshot.width,
            height: snapshot.height,
            pixels: snapshot
                .cells
                .into_iter()
                .map(|(coordinate, color)| (coordinate.key(), color.into_string()))
                .collect(),
        }
    }
}

impl From<CooldownCheck> for http::CooldownDto {
    fn from(check: CooldownCheck) -> Self {
        Self {
            can_place: check.allowed,
            remaining_seconds: check.remaining_seconds(),
        }
    }
}

impl From<&Palette> for http::ColorsDto {
    fn from(palette: &Palette) -> Self {
        Self {
            colors: palette
                .colors()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }
}
