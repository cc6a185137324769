//! Screener configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::returns::ReturnWindow;

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ─── Config ──────────────────────────────────────────────────────────

/// Tunables for evaluation and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// Size of the evaluation pool. Zero uses rayon's global pool.
    pub worker_threads: usize,

    /// Lifetime of cached evaluations in seconds. Zero disables caching.
    pub cache_ttl_secs: u64,

    /// Treat unregistered functions as FAILED while ranking.
    pub ignore_unsupported_functions: bool,

    /// Resolve multi-source arguments concurrently.
    pub parallel_arguments: bool,

    /// Window codes reported in stock profiles, in output order.
    pub return_windows: Vec<String>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            cache_ttl_secs: 30,
            ignore_unsupported_functions: true,
            parallel_arguments: true,
            return_windows: ReturnWindow::DEFAULTS
                .iter()
                .map(|w| w.code().to_string())
                .collect(),
        }
    }
}

impl ScreenerConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.windows().map(|_| ())
    }

    /// Parsed return windows, in configured order.
    pub fn windows(&self) -> Result<Vec<ReturnWindow>, ConfigError> {
        self.return_windows
            .iter()
            .map(|code| {
                code.parse::<ReturnWindow>()
                    .map_err(|_| ConfigError::Invalid(format!("unknown return window '{code}'")))
            })
            .collect()
    }

    /// Cache lifetime, or `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}
