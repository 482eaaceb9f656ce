//! Configuration file: ~/.therapy/config.toml
//!
//! Every section is optional; missing keys fall back to defaults. String
//! values may reference environment variables as `${VAR}`.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::db::pool::DEFAULT_MAX_CONNECTIONS;
use crate::models::SupportedLocales;

static VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("invalid variable regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TherapyConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub locales: SupportedLocales,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    pub cors_permissive: bool,
    pub timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Falls back to `DATABASE_URL` when unset
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl TherapyConfig {
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse TOML text, expanding `${VAR}` references first.
    pub fn parse(content: &str) -> Result<Self> {
        let expanded = expand_vars(content);
        let config: Self = toml::from_str(&expanded).context("Failed to parse config file (invalid TOML)")?;

        config.locales.validate().context("Invalid [locales] section")?;
        Ok(config)
    }

    /// ~/.therapy/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".therapy")
            .join("config.toml")
    }

    /// Configured database URL, else `DATABASE_URL`.
    pub fn database_url(&self) -> Option<String> {
        self.database
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| env::var("DATABASE_URL").ok())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(path, toml_str).with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

/// Replace `${VAR}` with the variable's value; unset variables become empty.
pub fn expand_vars(s: &str) -> String {
    VAR_RE
        .replace_all(s, |caps: &Captures<'_>| env::var(&caps[1]).unwrap_or_default())
        .into_owned()
}
