use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use therapy_server::TherapyConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Print the effective configuration (file merged over defaults)
    Show,
    /// Write a config file with the default values
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, config_path: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(config_path),
        ConfigCommands::Init(args) => run_init(args, config_path),
    }
}

fn run_show(config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path)?;
    let rendered = toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;
    print!("{rendered}");
    Ok(())
}

fn run_init(args: InitArgs, config_path: &Path) -> Result<()> {
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config already exists at {}\n\nUse --force to overwrite",
            config_path.display()
        );
    }

    TherapyConfig::default().save_to(config_path)?;
    println!("Wrote {}", config_path.display());
    Ok(())
}
