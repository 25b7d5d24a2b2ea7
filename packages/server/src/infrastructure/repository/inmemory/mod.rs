//! InMemory Repository 実装

mod canvas;
mod cooldown;

pub use canvas::InMemoryCanvasRepository;
pub use cooldown::InMemoryCooldownRepository;
