//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Message type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    PixelUpdate,
}

/// Payload of a pixel update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelUpdateData {
    pub x: u32,
    pub y: u32,
    pub color: String,
}

/// `{"type": "pixel_update", "data": {"x": .., "y": .., "color": ..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelUpdateMessage {
    pub r#type: MessageType,
    pub data: PixelUpdateData,
}
