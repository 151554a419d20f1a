//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for arxline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub oai: OaiConfig,
    pub retry: RetryConfig,
    pub workers: WorkersConfig,
    pub daily: DailyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OaiConfig {
    pub base_url: String,
}

impl Default for OaiConfig {
    fn default() -> Self {
        Self {
            base_url: arxline_oai::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Seconds to wait between attempts on the same URL.
    pub backoff_secs: u64,
    /// Attempt cap; absent means retry forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_secs: 60,
            max_attempts: None,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> arxline_core::RetryPolicy {
        arxline_core::RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: std::time::Duration::from_secs(self.backoff_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub default: usize,
    pub max: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        // Sets are harvested sequentially by default; the endpoint
        // rate-limits per client, so parallelism is opt-in.
        Self { default: 1, max: 8 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DailyConfig {
    /// Destination root for daily output, laid out as
    /// `{dest_prefix}/{year}/{date}.json`.
    pub dest_prefix: Option<PathBuf>,
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            dest_prefix: std::env::var_os("ARXLINE_DEST_PREFIX").map(PathBuf::from),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./arxline.toml (current directory)
    /// 2. ~/.config/arxline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("arxline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "arxline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
