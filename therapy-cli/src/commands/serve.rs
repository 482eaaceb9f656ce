//! HTTP server command
//!
//! Flags override the config file, which overrides the built-in defaults.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use therapy_server::db::MemoryStore;
use therapy_server::{run_server, AppState, ServerConfig, TherapyConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Keep data in process memory instead of PostgreSQL; lost on exit
    #[arg(long)]
    pub in_memory: bool,
}

impl ServeArgs {
    fn server_config(&self, config: &TherapyConfig) -> ServerConfig {
        let mut server = ServerConfig::from(config.server.clone());
        if let Some(bind) = self.bind {
            server.bind_addr = bind;
        }
        if let Some(timeout) = self.timeout {
            server.timeout_secs = timeout;
        }
        server.cors_permissive |= self.cors_permissive;
        server
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path)?;
    let server = args.server_config(&config);

    let state = if args.in_memory {
        tracing::warn!("In-memory store: data will not survive a restart");
        AppState::in_memory(MemoryStore::new(), config.locales.clone())?
    } else {
        let url = super::database_url(args.database_url, &config)?;
        let pool = super::connect(&url, &config).await?;
        AppState::postgres(pool, config.locales.clone())?
    };

    tracing::info!(
        bind = %server.bind_addr,
        locales = ?config.locales.supported,
        "Starting therapy server"
    );

    // Blocks until shutdown
    run_server(state, server).await.context("Server error")?;

    Ok(())
}
