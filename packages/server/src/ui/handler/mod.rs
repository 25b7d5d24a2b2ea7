//! Request handlers.

mod http;
mod websocket;

pub use http::{get_canvas, get_colors, get_cooldown, health_check, place_pixel};
pub use websocket::websocket_handler;
