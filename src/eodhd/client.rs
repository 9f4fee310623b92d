//! EODHD API client for fetching end-of-day history
//!
//! Requires an API token (`EODHD_API_KEY`). Transport errors and 5xx
//! responses are retried with exponential backoff; 4xx responses fail
//! immediately. Every failure reaching the caller is `DataUnavailable`.
//!
//! # Example
//! ```no_run
//! use fx_hedge::eodhd::EodhdClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EodhdClient::new(Some("api_key".to_string()))?;
//!     let bars = client.fetch_history("EURUSD.FOREX", 2000).await?;
//!     println!("Fetched {} bars", bars.len());
//!     Ok(())
//! }
//! ```

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

use super::types::{to_price_bars, EodBar};
use crate::data::validate_bars;
use crate::error::{HedgeError, HedgeResult};
use crate::provider::PriceHistoryProvider;
use crate::PriceBar;

/// Base URL for the EODHD API
pub const EODHD_API_BASE: &str = "https://eodhd.com/api";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub max_retries: u32,
    pub timeout: StdDuration,
    /// Delay before the first retry; doubles on each further retry
    pub backoff: StdDuration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: EODHD_API_BASE.to_string(),
            max_retries: 3,
            timeout: StdDuration::from_secs(30),
            backoff: StdDuration::from_millis(500),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: StdDuration) -> Self {
        self.backoff = backoff;
        self
    }
}

enum Attempt {
    Retryable(String),
    Fatal(String),
}

/// EODHD API client
#[derive(Debug, Clone)]
pub struct EodhdClient {
    client: Client,
    api_key: Option<String>,
    config: ClientConfig,
}

impl EodhdClient {
    /// Create a client against the public API
    pub fn new(api_key: Option<String>) -> anyhow::Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(api_key: Option<String>, config: ClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            config,
        })
    }

    /// Fetch raw end-of-day rows for `ticker` from `from` onwards, ascending
    pub async fn get_eod(&self, ticker: &str, from: NaiveDate) -> HedgeResult<Vec<EodBar>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| HedgeError::unavailable("EODHD_API_KEY is not configured"))?;

        let mut attempt = 0;
        loop {
            match self.request_once(api_key, ticker, from).await {
                Ok(rows) => return Ok(rows),
                Err(Attempt::Retryable(msg)) if attempt < self.config.max_retries => {
                    let delay = self.config.backoff * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        "EODHD request failed ({}), retry {}/{} in {:?}",
                        msg, attempt, self.config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(Attempt::Retryable(msg)) | Err(Attempt::Fatal(msg)) => {
                    return Err(HedgeError::DataUnavailable(msg));
                }
            }
        }
    }

    async fn request_once(
        &self,
        api_key: &str,
        ticker: &str,
        from: NaiveDate,
    ) -> Result<Vec<EodBar>, Attempt> {
        let url = format!("{}/eod/{}", self.config.base_url, ticker);
        let from = from.format("%Y-%m-%d").to_string();

        debug!("Fetching EOD history: ticker={}, from={}", ticker, from);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_token", api_key),
                ("fmt", "json"),
                ("order", "a"),
                ("from", from.as_str()),
            ])
            .send()
            .await
            // without_url keeps the token out of the message
            .map_err(|e| Attempt::Retryable(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let msg = format!("EODHD API error {}: {}", status, truncate(&body, 200));
            return Err(if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                Attempt::Retryable(msg)
            } else {
                Attempt::Fatal(msg)
            });
        }

        response
            .json::<Vec<EodBar>>()
            .await
            .map_err(|e| Attempt::Fatal(format!("failed to parse EODHD response: {}", e.without_url())))
    }

    /// Fetch `lookback_days` calendar days of history ending today
    pub async fn fetch_history(&self, ticker: &str, lookback_days: u32) -> HedgeResult<Vec<PriceBar>> {
        let from = Utc::now().date_naive() - Duration::days(i64::from(lookback_days));
        let rows = self.get_eod(ticker, from).await?;
        let bars = to_price_bars(&rows)?;
        validate_bars(&bars)?;

        info!("Fetched {} bars for {} from EODHD", bars.len(), ticker);
        Ok(bars)
    }
}

#[async_trait]
impl PriceHistoryProvider for EodhdClient {
    fn name(&self) -> &'static str {
        "eodhd"
    }

    async fn fetch(&self, symbol: &str, lookback_days: u32) -> HedgeResult<Vec<PriceBar>> {
        self.fetch_history(symbol, lookback_days).await
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
