//! Core data types shared by the indicator engine, the state machine and
//! the collaborators

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{HedgeError, HedgeResult};

/// Default moving average window (trading days)
pub const DEFAULT_WINDOW: usize = 200;

/// Default hysteresis buffer as a fraction of the moving average
pub const DEFAULT_BUFFER_PCT: f64 = 0.01;

/// Daily close of the tracked spot series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// A price bar with a defined moving average and hysteresis bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    /// (close - sma) / sma in percent
    pub distance_pct: f64,
}

impl IndicatorRow {
    /// Close inside the hysteresis band, bounds included
    pub fn in_buffer_zone(&self) -> bool {
        self.close >= self.lower_band && self.close <= self.upper_band
    }
}

/// Hedge regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Trend supportive, no hedge on
    Bull,
    /// Trend adverse, hedge on
    Bear,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Bull => "BULL",
            Regime::Bear => "BEAR",
        }
    }

    pub fn is_hedged(&self) -> bool {
        matches!(self, Regime::Bear)
    }

    pub fn hedge_status(&self) -> &'static str {
        match self {
            Regime::Bull => "UNHEDGED",
            Regime::Bear => "HEDGED",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable signal derived from the regime change between two bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HedgeAction {
    OpenHedge,
    CloseHedge,
    Hold,
}

impl HedgeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HedgeAction::OpenHedge => "OPEN_HEDGE",
            HedgeAction::CloseHedge => "CLOSE_HEDGE",
            HedgeAction::Hold => "HOLD",
        }
    }

    pub fn is_transition(&self) -> bool {
        !matches!(self, HedgeAction::Hold)
    }
}

impl std::fmt::Display for HedgeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Indicator row annotated with the regime and action for that bar
///
/// Kept flat (no nested IndicatorRow) so it serializes straight to a CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub distance_pct: f64,
    pub regime: Regime,
    pub action: HedgeAction,
}

impl HedgeRow {
    pub fn from_indicator(row: &IndicatorRow, regime: Regime, action: HedgeAction) -> Self {
        Self {
            date: row.date,
            close: row.close,
            sma: row.sma,
            upper_band: row.upper_band,
            lower_band: row.lower_band,
            distance_pct: row.distance_pct,
            regime,
            action,
        }
    }

    /// Close inside the hysteresis band, bounds included
    pub fn in_buffer_zone(&self) -> bool {
        self.close >= self.lower_band && self.close <= self.upper_band
    }

    /// Price distance left before the regime would flip
    ///
    /// Bear flips above the upper band, Bull flips below the lower band.
    pub fn buffer_to_flip(&self) -> f64 {
        match self.regime {
            Regime::Bear => self.upper_band - self.close,
            Regime::Bull => self.close - self.lower_band,
        }
    }
}

/// Indicator and hysteresis parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeParams {
    /// Moving average window in bars
    #[serde(default = "default_window")]
    pub window: usize,
    /// Band half-width as a fraction of the moving average (0.01 = 1%)
    #[serde(default = "default_buffer_pct")]
    pub buffer_pct: f64,
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_buffer_pct() -> f64 {
    DEFAULT_BUFFER_PCT
}

impl Default for HedgeParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            buffer_pct: DEFAULT_BUFFER_PCT,
        }
    }
}

impl HedgeParams {
    pub fn new(window: usize, buffer_pct: f64) -> HedgeResult<Self> {
        let params = Self { window, buffer_pct };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> HedgeResult<()> {
        if self.window == 0 {
            return Err(HedgeError::InvalidParameter(
                "window must be at least 1".to_string(),
            ));
        }
        if !self.buffer_pct.is_finite() || !(0.0..1.0).contains(&self.buffer_pct) {
            return Err(HedgeError::InvalidParameter(format!(
                "buffer_pct must be in [0, 1), got {}",
                self.buffer_pct
            )));
        }
        Ok(())
    }

    /// Bars needed for a state machine run: one full window plus one step
    pub fn required_bars(&self) -> usize {
        self.window + 1
    }

    /// Human label for the band width, e.g. "1%" or "0.5%"
    pub fn buffer_label(&self) -> String {
        let pct = self.buffer_pct * 100.0;
        if (pct - pct.round()).abs() < 1e-9 {
            format!("{:.0}%", pct)
        } else {
            format!("{}%", pct)
        }
    }
}
