//! Subcommand implementations

pub mod check;
pub mod dashboard;
pub mod download;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use fx_hedge::config::{ProviderKind, SecretStore, EODHD_API_KEY};
use fx_hedge::data::Freshness;
use fx_hedge::eodhd::EodhdClient;
use fx_hedge::{Config, CsvHistoryProvider, HedgeResult, PriceBar, PriceHistoryProvider};
use std::path::Path;
use tracing::info;

/// Command line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<String>,
    pub symbol: Option<String>,
    pub window: Option<usize>,
    pub buffer: Option<f64>,
    pub csv_dir: Option<String>,
}

impl Overrides {
    /// Load `.env`, the config file and then apply command line overrides
    pub fn load_config(&self) -> Result<Config> {
        dotenv::dotenv().ok();

        let mut config = Config::load(self.config_path.as_deref().map(Path::new))?;
        match &self.config_path {
            Some(path) => info!("Loaded configuration from: {}", path),
            None => info!("No config file given, using defaults"),
        }

        if let Some(symbol) = &self.symbol {
            info!("Overriding symbol to: {}", symbol);
            config.market.symbol = symbol.clone();
        }
        if let Some(window) = self.window {
            info!("Overriding window to: {}", window);
            config.strategy.window = window;
        }
        if let Some(buffer) = self.buffer {
            info!("Overriding buffer to: {}", buffer);
            config.strategy.buffer_pct = buffer;
        }
        if let Some(dir) = &self.csv_dir {
            info!("Reading history from CSV directory: {}", dir);
            config.market.provider = ProviderKind::Csv;
            config.market.data_dir = dir.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Provider selected by `market.provider`
pub fn build_provider(config: &Config, secrets: &SecretStore) -> Result<Box<dyn PriceHistoryProvider>> {
    let provider: Box<dyn PriceHistoryProvider> = match config.market.provider {
        ProviderKind::Eodhd => Box::new(EodhdClient::with_config(
            secrets.get(EODHD_API_KEY),
            config.eodhd_client_config(),
        )?),
        ProviderKind::Csv => Box::new(CsvHistoryProvider::new(&config.market.data_dir)),
    };
    info!("Using {} price history provider", provider.name());
    Ok(provider)
}

/// Fetch the configured symbol and lookback
pub fn fetch_history(
    rt: &tokio::runtime::Runtime,
    provider: &dyn PriceHistoryProvider,
    config: &Config,
) -> HedgeResult<Vec<PriceBar>> {
    rt.block_on(provider.fetch(&config.market.symbol, config.market.lookback_days))
}

/// Freshness of the newest bar against today's date
pub fn assess_freshness(bars: &[PriceBar], config: &Config) -> Freshness {
    let today: NaiveDate = Utc::now().date_naive();
    match bars.last() {
        Some(bar) => Freshness::assess(bar.date, today, config.market.max_staleness_days),
        None => Freshness::Fresh,
    }
}
