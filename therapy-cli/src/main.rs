//! therapy CLI - run the stubs server and maintain labels
//!
//! - `serve`: HTTP server over PostgreSQL or an in-process store
//! - `migrate`: create the schema
//! - `labels`: bulk import and prefix search
//! - `config`: inspect or create ~/.therapy/config.toml

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use therapy_server::TherapyConfig;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "therapy",
    author,
    version,
    about = "Therapy stubs and labels server",
    long_about = "Browse, search and edit therapy stubs over HTTP, and manage the labels \
                  attached to them."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.therapy/config.toml)
    #[arg(long, global = true, env = "THERAPY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (applies migrations first)
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Label maintenance (import, search)
    Labels(commands::labels::LabelsArgs),
    /// Manage therapy configuration (path, show, init)
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: clap_complete::Shell,
}

/// Load `.env` from the working directory, then ~/.therapy/.env.
fn load_dotenv() {
    dotenvy::dotenv().ok();
    if let Some(home) = dirs::home_dir() {
        dotenvy::from_path(home.join(".therapy").join(".env")).ok();
    }
}

fn run_completions(args: CompletionsArgs) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, bin_name, &mut io::stdout());
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.unwrap_or_else(TherapyConfig::config_path);

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config_path).await?,
        Commands::Migrate(args) => commands::run_migrate(args, &config_path).await?,
        Commands::Labels(args) => commands::run_labels(args, &config_path).await?,
        Commands::Config(args) => commands::run_config(args, &config_path)?,
        Commands::Completions(args) => run_completions(args),
    }
    Ok(())
}
