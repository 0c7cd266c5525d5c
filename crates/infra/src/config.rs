//! Application configuration: optional TOML file, then environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hsepartner_observability::{LogFormat, ObservabilityConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log: ObservabilityConfig,
    /// File holding the persisted session entry.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    /// Start from the demo stockroom instead of an empty ledger.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("hsepartner_storage.json")
}

const fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log: ObservabilityConfig::default(),
            session_path: default_session_path(),
            seed_demo_data: default_true(),
        }
    }
}

impl AppConfig {
    /// Read `path` if given and present, then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    pub fn load_with(path: Option<&Path>, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.with_overrides(var)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply `RUST_LOG`, `HSE_LOG`, `HSE_LOG_FORMAT`, `HSE_SESSION_PATH` and
    /// `HSE_SEED_DEMO` as looked up through `var`. `HSE_LOG` wins over `RUST_LOG`.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(filter) = var("RUST_LOG") {
            self.log.filter = filter;
        }
        if let Some(filter) = var("HSE_LOG") {
            self.log.filter = filter;
        }
        if let Some(format) = var("HSE_LOG_FORMAT") {
            self.log.format = format
                .parse::<LogFormat>()
                .map_err(anyhow::Error::msg)
                .context("Invalid HSE_LOG_FORMAT")?;
        }
        if let Some(path) = var("HSE_SESSION_PATH") {
            self.session_path = PathBuf::from(path);
        }
        if let Some(seed) = var("HSE_SEED_DEMO") {
            self.seed_demo_data = seed
                .trim()
                .parse::<bool>()
                .with_context(|| format!("Invalid HSE_SEED_DEMO '{seed}'"))?;
        }
        Ok(self)
    }
}
