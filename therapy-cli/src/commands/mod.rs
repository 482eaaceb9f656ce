//! Command implementations for the therapy CLI

pub mod config;
pub mod labels;
pub mod migrate;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use therapy_server::db::{create_pool_with_options, migrations, PgPool};
use therapy_server::TherapyConfig;

// Re-export dispatcher functions for flat access from main.rs
pub use config::run_config;
pub use labels::run_labels;
pub use migrate::run_migrate;
pub use serve::run_serve;

/// Load the config file, falling back to defaults when it does not exist.
pub(crate) fn load_config(path: &Path) -> Result<TherapyConfig> {
    TherapyConfig::load_from(path)
}

/// Flag or env value first, then the config file.
pub(crate) fn database_url(flag: Option<String>, config: &TherapyConfig) -> Result<String> {
    flag.filter(|url| !url.is_empty())
        .or_else(|| config.database_url())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or [database] url in the config file")
}

/// Connect and bring the schema up to date.
pub(crate) async fn connect(url: &str, config: &TherapyConfig) -> Result<PgPool> {
    let pool = create_pool_with_options(url, config.database.max_connections)
        .await
        .context("Failed to create database pool")?;
    migrations::run(&pool).await.context("Failed to run migrations")?;
    Ok(pool)
}
