//! Price history provider contract
//!
//! The engine never fetches data itself. Whatever implements
//! [`PriceHistoryProvider`] is the single source of truth for the series and
//! owns any timeout or retry policy.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data::{load_csv, trim_to_lookback};
use crate::error::HedgeResult;
use crate::PriceBar;

/// Source of daily bars for one symbol
///
/// Implementations return bars in ascending date order without duplicate
/// dates, and map transport or non-success responses to `DataUnavailable`.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Short name used in logs and alerts
    fn name(&self) -> &'static str;

    async fn fetch(&self, symbol: &str, lookback_days: u32) -> HedgeResult<Vec<PriceBar>>;
}

/// Reads `{data_dir}/{symbol}.csv` files written by the download command
#[derive(Debug, Clone)]
pub struct CsvHistoryProvider {
    data_dir: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }
}

#[async_trait]
impl PriceHistoryProvider for CsvHistoryProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch(&self, symbol: &str, lookback_days: u32) -> HedgeResult<Vec<PriceBar>> {
        let path = self.path_for(symbol);
        let bars = trim_to_lookback(load_csv(&path)?, lookback_days);
        info!("Loaded {} bars for {} from {}", bars.len(), symbol, path.display());
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::save_csv;
    use crate::error::HedgeError;
    use chrono::{Duration, NaiveDate};

    #[tokio::test]
    async fn test_csv_provider() {
        let dir = tempfile::tempdir().unwrap();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars: Vec<PriceBar> = (0..100)
            .map(|i| PriceBar::new(start + Duration::days(i), 1.1))
            .collect();
        save_csv(&bars, dir.path(), "EURUSD.FOREX").unwrap();

        let provider = CsvHistoryProvider::new(dir.path());
        assert_eq!(provider.fetch("EURUSD.FOREX", 2000).await.unwrap().len(), 100);
        assert_eq!(provider.fetch("EURUSD.FOREX", 9).await.unwrap().len(), 10);

        let err = provider.fetch("GBPUSD.FOREX", 2000).await.unwrap_err();
        assert!(matches!(err, HedgeError::DataUnavailable(_)));
    }
}
