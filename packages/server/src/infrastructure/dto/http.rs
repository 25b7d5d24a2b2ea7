//! HTTP API request and response DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `GET /api/canvas` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasDto {
    pub width: u32,
    pub height: u32,
    /// `"x,y"` -> color
    pub pixels: BTreeMap<String, String>,
}

/// `POST /api/place-pixel` form body
///
/// Coordinates are kept as text so that integers of any size reach the bounds
/// check instead of failing deserialization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlacePixelForm {
    pub x: String,
    pub y: String,
    pub color: String,
}

/// `POST /api/place-pixel` success response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacePixelResponseDto {
    pub success: bool,
    /// RFC 3339 timestamp
    pub cooldown_until: String,
}

/// `GET /api/cooldown` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownDto {
    pub can_place: bool,
    pub remaining_seconds: u64,
}

/// `GET /api/colors` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorsDto {
    pub colors: Vec<String>,
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub detail: String,
}
