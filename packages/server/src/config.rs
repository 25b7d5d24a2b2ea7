//! Server configuration from command-line flags and environment variables.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use thiserror::Error;

use crate::domain::{CanvasSettings, Palette, ValueObjectError};

/// Minimum length of the session signing secret in bytes
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Parser, Debug, Clone)]
#[command(name = "tsubu-server")]
#[command(about = "Shared pixel canvas server with real-time updates", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TSUBU_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TSUBU_PORT", default_value = "8000")]
    pub port: u16,

    /// Canvas width in cells
    #[arg(long, env = "TSUBU_CANVAS_WIDTH", default_value_t = 200)]
    pub canvas_width: u32,

    /// Canvas height in cells
    #[arg(long, env = "TSUBU_CANVAS_HEIGHT", default_value_t = 150)]
    pub canvas_height: u32,

    /// Seconds a user must wait between placements
    #[arg(long, env = "TSUBU_COOLDOWN_SECONDS", default_value_t = 30)]
    pub cooldown_seconds: u64,

    /// Allowed colors as comma separated #RRGGBB values (defaults to the 16-color palette)
    #[arg(long, env = "TSUBU_COLORS", value_delimiter = ',')]
    pub colors: Vec<String>,

    /// SQLite database URL
    #[arg(long, env = "TSUBU_DATABASE_URL", default_value = "sqlite://tsubu.db")]
    pub database_url: String,

    /// Keep the canvas in memory only (nothing survives a restart)
    #[arg(long, env = "TSUBU_IN_MEMORY")]
    pub in_memory: bool,

    /// Secret used to sign session cookies (random per process if omitted)
    #[arg(long, env = "TSUBU_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Directory with the frontend files to serve
    #[arg(long, env = "TSUBU_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Milliseconds to wait for a slow viewer before dropping it
    #[arg(long, env = "TSUBU_SEND_TIMEOUT_MS", default_value_t = 2000)]
    pub send_timeout_ms: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid canvas settings: {0}")]
    Canvas(#[from] ValueObjectError),

    #[error("session secret must be at least {MIN_SESSION_SECRET_LEN} bytes (got {0})")]
    SessionSecretTooShort(usize),

    #[error("send timeout must be positive")]
    InvalidSendTimeout,
}

/// Where canvas and cooldown data live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Sqlite { url: String },
}

/// Validated server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub canvas: CanvasSettings,
    pub store: StoreConfig,
    pub session_secret: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub send_timeout: Duration,
    pub log_level: String,
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let palette = if args.colors.is_empty() {
            Palette::default()
        } else {
            let colors: Vec<&str> = args.colors.iter().map(|c| c.trim()).collect();
            Palette::new(colors.as_slice())?
        };
        let canvas = CanvasSettings::new(
            args.canvas_width,
            args.canvas_height,
            palette,
            Duration::from_secs(args.cooldown_seconds),
        )?;

        if let Some(secret) = &args.session_secret {
            if secret.len() < MIN_SESSION_SECRET_LEN {
                return Err(ConfigError::SessionSecretTooShort(secret.len()));
            }
        }

        if args.send_timeout_ms == 0 {
            return Err(ConfigError::InvalidSendTimeout);
        }

        let store = if args.in_memory {
            StoreConfig::InMemory
        } else {
            StoreConfig::Sqlite {
                url: args.database_url,
            }
        };

        Ok(Self {
            host: args.host,
            port: args.port,
            canvas,
            store,
            session_secret: args.session_secret,
            static_dir: args.static_dir,
            send_timeout: Duration::from_millis(args.send_timeout_ms),
            log_level: args.log_level,
        })
    }
}
