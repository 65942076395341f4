//! Coordinator Configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::selector::DEFAULT_PREFIX;

/// Host-facing configuration. Every field has a default, so a TOML file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Attribute namespace prefix (`bb-` gives `bb-share` / `data-bb-share`)
    pub prefix: String,

    /// Log pass summaries at info level
    pub debug: bool,

    /// Boolean attribute (under the prefix) that turns on performance mode
    /// when present on `<html>`, `<body>` or the scope element
    pub performance_mode_attribute: String,

    /// Attribute (under the prefix) marking the pass scope element
    pub scope_attribute: String,

    /// Attribute (under the prefix) suppressing a whole subtree
    pub disable_attribute: String,

    pub timing: Timing,

    pub i18n: I18n,

    pub video_feed: VideoFeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            debug: false,
            performance_mode_attribute: "performance".to_string(),
            scope_attribute: "scope".to_string(),
            disable_attribute: "disable".to_string(),
            timing: Timing::default(),
            i18n: I18n::default(),
            video_feed: VideoFeedConfig::default(),
        }
    }
}

/// Delays and bounds for re-runs and retries, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub debounce_ms: u64,
    pub performance_debounce_ms: u64,
    pub retry_base_ms: u64,
    pub performance_retry_base_ms: u64,
    pub max_retries: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            performance_debounce_ms: 500,
            retry_base_ms: 1000,
            performance_retry_base_ms: 2000,
            max_retries: 3,
        }
    }
}

impl Timing {
    pub fn debounce(&self, performance_mode: bool) -> u64 {
        if performance_mode { self.performance_debounce_ms } else { self.debounce_ms }
    }

    pub fn retry_base(&self, performance_mode: bool) -> u64 {
        if performance_mode { self.performance_retry_base_ms } else { self.retry_base_ms }
    }
}

/// User-visible strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18n {
    pub copied: String,
    pub missing_config: String,
    pub feed_error: String,
    pub share_default_text: String,
}

impl Default for I18n {
    fn default() -> Self {
        Self {
            copied: "Link copied!".to_string(),
            missing_config: "Video feed is not configured.".to_string(),
            feed_error: "Videos could not be loaded.".to_string(),
            share_default_text: "Check out this site".to_string(),
        }
    }
}

/// Remote video feed settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoFeedConfig {
    /// Proxy endpoint; without it the feed renders `i18n.missing_config`
    pub endpoint: Option<String>,
    /// Where to persist the response cache between runs
    pub cache_file: Option<PathBuf>,
    pub cache_ttl_hours: u64,
}

impl Default for VideoFeedConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            cache_file: None,
            cache_ttl_hours: 24,
        }
    }
}

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Parse TOML, filling unspecified keys with defaults
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
