//! HTTP and WebSocket gateway.

mod handler;
mod server;
mod session;
mod signal;
pub mod state;

pub use server::Server;
pub use session::SESSION_COOKIE_NAME;
pub use state::AppState;
