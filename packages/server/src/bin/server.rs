//! Shared pixel canvas server.
//!
//! Serves the canvas over HTTP and pushes every placed pixel to all WebSocket viewers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsubu-server
//! cargo run --bin tsubu-server -- --host 0.0.0.0 --port 3000 --in-memory
//! ```

use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use clap::Parser;
use tsubu_server::{
    config::{Args, ServerConfig, StoreConfig},
    domain::{BroadcastHub, CanvasRepository, CooldownRepository},
    infrastructure::{
        broadcast::WebSocketBroadcastHub,
        repository::{
            InMemoryCanvasRepository, InMemoryCooldownRepository, SqliteCanvasRepository,
            SqliteCooldownRepository, connect_sqlite,
        },
    },
    ui::{AppState, Server},
    usecase::{
        ConnectViewerUseCase, DisconnectViewerUseCase, GetCanvasUseCase, GetCooldownUseCase,
        GetPaletteUseCase, PlacePixelUseCase,
    },
};
use tsubu_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

const SQLITE_MAX_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(
        &[env!("CARGO_BIN_NAME"), "tsubu_shared", "tower_http"],
        &args.log_level,
    );

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::try_from(args)?;
    tracing::info!(
        "Canvas {}x{}, {} color(s), cooldown {}s",
        config.canvas.width(),
        config.canvas.height(),
        config.canvas.palette().colors().len(),
        config.canvas.cooldown().as_secs()
    );

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. BroadcastHub
    // 3. UseCases
    // 4. AppState
    // 5. Server

    // 1. Create Repositories
    let (canvas, cooldowns): (Arc<dyn CanvasRepository>, Arc<dyn CooldownRepository>) =
        match &config.store {
            StoreConfig::InMemory => {
                tracing::warn!("Running with in-memory store, the canvas is lost on restart");
                (
                    Arc::new(InMemoryCanvasRepository::new()),
                    Arc::new(InMemoryCooldownRepository::new()),
                )
            }
            StoreConfig::Sqlite { url } => {
                let pool = connect_sqlite(url, SQLITE_MAX_CONNECTIONS).await?;
                (
                    Arc::new(SqliteCanvasRepository::new(pool.clone())),
                    Arc::new(SqliteCooldownRepository::new(pool)),
                )
            }
        };

    // 2. Create BroadcastHub (WebSocket implementation)
    let broadcast_hub: Arc<dyn BroadcastHub> =
        Arc::new(WebSocketBroadcastHub::new(config.send_timeout));

    // 3. Create UseCases
    let settings = Arc::new(config.canvas.clone());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let place_pixel_usecase = Arc::new(PlacePixelUseCase::new(
        settings.clone(),
        canvas.clone(),
        cooldowns.clone(),
        broadcast_hub.clone(),
        clock.clone(),
    ));
    let get_canvas_usecase = Arc::new(GetCanvasUseCase::new(settings.clone(), canvas));
    let get_cooldown_usecase = Arc::new(GetCooldownUseCase::new(cooldowns, clock));
    let get_palette_usecase = Arc::new(GetPaletteUseCase::new(settings));
    let connect_viewer_usecase = Arc::new(ConnectViewerUseCase::new(broadcast_hub.clone()));
    let disconnect_viewer_usecase = Arc::new(DisconnectViewerUseCase::new(broadcast_hub));

    // 4. Create AppState
    let cookie_key = match &config.session_secret {
        Some(secret) => Key::derive_from(secret.as_bytes()),
        None => {
            tracing::warn!("No session secret given, sessions will not survive a restart");
            Key::generate()
        }
    };
    let app_state = AppState {
        place_pixel_usecase,
        get_canvas_usecase,
        get_cooldown_usecase,
        get_palette_usecase,
        connect_viewer_usecase,
        disconnect_viewer_usecase,
        cookie_key,
    };

    // 5. Create and run the server
    let mut server = Server::new(app_state);
    if let Some(dir) = config.static_dir.clone() {
        server = server.with_static_dir(dir);
    }
    server.run(config.host, config.port).await
}
