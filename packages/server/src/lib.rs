//! Shared pixel canvas server.
//!
//! Users place one colored pixel at a time on a fixed-size grid, limited by a
//! per-user cooldown, and every committed placement is pushed to all connected
//! WebSocket viewers.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
