//! Configuration management
//!
//! Loads configuration from config.toml with support for:
//! - Report retrieval settings
//! - Leaderboard percentile and sort direction
//! - Strict / lenient processing
//! - Per-repository typo and bot tables

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ranking::{RatioOrder, DEFAULT_TOP_PERCENTILE};
use crate::replacements::KnownReplacements;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub replacements: KnownReplacements,
}

/// Where findings reports are downloaded from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub raw_host: String,
    pub branch: String,
    pub report_file: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub top_percentile: f64,
    #[serde(default)]
    pub ratio_order: RatioOrder,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub exclude_zero_score: bool,
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    /// Load from config.toml or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load from specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            toml::from_str(DEFAULT_CONFIG).context("Failed to parse default config")
        }
    }

    /// GitHub token: explicit value first, then GITHUB_TOKEN.
    pub fn github_token(explicit: Option<String>) -> Option<String> {
        explicit.filter(|t| !t.is_empty()).or_else(|| {
            std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
        })
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            raw_host: "raw.githubusercontent.com".to_string(),
            branch: "main".to_string(),
            report_file: "report.md".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_percentile: DEFAULT_TOP_PERCENTILE,
            ratio_order: RatioOrder::Ascending,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        // The embedded default config is covered by tests, the fallback
        // mirrors it.
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            github: GitHubConfig::default(),
            ranking: RankingConfig::default(),
            processing: ProcessingConfig::default(),
            replacements: KnownReplacements::builtin(),
        })
    }
}
