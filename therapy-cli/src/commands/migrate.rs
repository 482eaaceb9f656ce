//! Schema command

use std::path::Path;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs, config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path)?;
    let url = super::database_url(args.database_url, &config)?;

    // connect() applies the migrations
    super::connect(&url, &config).await?;
    println!("Schema is up to date");
    Ok(())
}
