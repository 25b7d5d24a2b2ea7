//! Server execution logic.

use std::path::PathBuf;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::{
    handler::{get_canvas, get_colors, get_cooldown, health_check, place_pixel, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Pixel canvas server
///
/// This struct holds the application state and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state).with_static_dir("static".into());
/// server.run("127.0.0.1".to_string(), 8000).await?;
/// ```
pub struct Server {
    state: AppState,
    /// Frontend files served for unmatched paths
    static_dir: Option<PathBuf>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            static_dir: None,
        }
    }

    /// Serve the frontend from `dir` for every path the API does not handle
    pub fn with_static_dir(mut self, dir: PathBuf) -> Self {
        self.static_dir = Some(dir);
        self
    }

    /// Build the router with all endpoints and middleware
    pub fn router(&self) -> Router {
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/canvas", get(get_canvas))
            .route("/api/place-pixel", post(place_pixel))
            .route("/api/cooldown", get(get_cooldown))
            .route("/api/colors", get(get_colors))
            .with_state(self.state.clone());

        let app = match &self.static_dir {
            Some(dir) => {
                let serve_dir = ServeDir::new(dir)
                    .append_index_html_on_directories(true)
                    .fallback(ServeFile::new(dir.join("index.html")));
                app.fallback_service(serve_dir)
            }
            None => app,
        };

        app.layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Run the server on `host:port` until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        self.serve(listener).await
    }

    /// Run the server on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let local_addr = listener.local_addr()?;
        let app = self.router();

        tracing::info!("Pixel canvas server listening on http://{}", local_addr);
        tracing::info!("Viewers connect to: ws://{}/ws", local_addr);
        if let Some(dir) = &self.static_dir {
            tracing::info!("Serving frontend from {}", dir.display());
        }
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
