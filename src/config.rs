//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files. Every section
//! has defaults, so an empty `{}` file (or no file at all) is a valid
//! configuration for the EUR/USD daily check.
//!
//! Credentials resolve through a [`SecretStore`]: the config file's
//! `secrets` map first, then the process environment (after `.env` has been
//! loaded by the binary).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::eodhd::{ClientConfig, EODHD_API_BASE};
use crate::notify::{ReportOptions, TelegramConfig, TELEGRAM_API_BASE};
use crate::HedgeParams;

pub const EODHD_API_KEY: &str = "EODHD_API_KEY";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub strategy: HedgeParams,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Inline secrets; take priority over environment variables
    #[serde(default, skip_serializing)]
    pub secrets: HashMap<String, String>,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        if self.market.symbol.trim().is_empty() {
            anyhow::bail!("market.symbol must not be empty");
        }
        if self.market.max_staleness_days < 0 {
            anyhow::bail!("market.max_staleness_days must not be negative");
        }
        Ok(())
    }

    /// Secret lookup order for this configuration
    pub fn secret_store(&self) -> SecretStore {
        SecretStore::new(vec![
            SecretSource::Map(self.secrets.clone()),
            SecretSource::Environment,
        ])
    }

    pub fn eodhd_client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.market.base_url.clone())
            .with_max_retries(self.market.max_retries)
            .with_timeout(Duration::from_secs(self.market.timeout_secs))
    }

    pub fn telegram_config(&self, secrets: &SecretStore) -> TelegramConfig {
        TelegramConfig::new(secrets.get(TELEGRAM_BOT_TOKEN), secrets.get(TELEGRAM_CHAT_ID))
            .with_base_url(self.notifier.telegram_base_url.clone())
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            title: self.notifier.title.clone(),
            pair_label: self.market.pair_label.clone(),
            dashboard_url: self.notifier.dashboard_url.clone(),
            put_delta: self.notifier.put_delta,
            call_delta: self.notifier.call_delta,
        }
    }
}

/// Where the price history comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Eodhd,
    Csv,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eodhd" => Ok(ProviderKind::Eodhd),
            "csv" => Ok(ProviderKind::Csv),
            _ => Err(format!("Unknown provider: {}. Use 'eodhd' or 'csv'", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Eodhd => write!(f, "eodhd"),
            ProviderKind::Csv => write!(f, "csv"),
        }
    }
}

/// Market data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Provider ticker, e.g. "EURUSD.FOREX"
    pub symbol: String,
    pub pair_label: String,
    /// Calendar days of history to request
    pub lookback_days: u32,
    pub provider: ProviderKind,
    /// Directory of `{symbol}.csv` files for the csv provider
    pub data_dir: String,
    pub base_url: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    /// Newest bar older than this (calendar days) counts as stale
    pub max_staleness_days: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            symbol: "EURUSD.FOREX".to_string(),
            pair_label: "EUR/USD".to_string(),
            lookback_days: 2000,
            provider: ProviderKind::Eodhd,
            data_dir: "data".to_string(),
            base_url: EODHD_API_BASE.to_string(),
            max_retries: 3,
            timeout_secs: 30,
            max_staleness_days: 4, // a Friday close read on Tuesday is still fresh
        }
    }
}

/// Report and delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub title: String,
    pub dashboard_url: Option<String>,
    pub telegram_base_url: String,
    pub put_delta: f64,
    pub call_delta: f64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        let report = ReportOptions::default();
        NotifierConfig {
            title: report.title,
            dashboard_url: None,
            telegram_base_url: TELEGRAM_API_BASE.to_string(),
            put_delta: report.put_delta,
            call_delta: report.call_delta,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dashboard_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dashboard_dir: "dashboard".to_string(),
        }
    }
}

/// One place a secret may be found
#[derive(Debug, Clone)]
pub enum SecretSource {
    Map(HashMap<String, String>),
    Environment,
}

impl SecretSource {
    fn lookup(&self, key: &str) -> Option<String> {
        match self {
            SecretSource::Map(map) => map.get(key).cloned(),
            SecretSource::Environment => std::env::var(key).ok(),
        }
    }
}

/// Prioritized list of secret sources; the first non-empty value wins
#[derive(Debug, Clone)]
pub struct SecretStore {
    sources: Vec<SecretSource>,
}

impl SecretStore {
    pub fn new(sources: Vec<SecretSource>) -> Self {
        Self { sources }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.sources
            .iter()
            .filter_map(|s| s.lookup(key))
            .find(|v| !v.trim().is_empty())
    }
}
