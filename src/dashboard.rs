//! Dashboard export
//!
//! Read-only view over an evaluated series: headline metrics for the latest
//! bar plus the chart series (close, average, both bands and transition
//! markers). Written as `dashboard.json` with a companion `hedge_rows.csv`.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data::{save_hedge_rows, Freshness};
use crate::strategy::HedgeSeries;
use crate::{HedgeAction, Regime};

pub const DASHBOARD_FILE: &str = "dashboard.json";
pub const ROWS_FILE: &str = "hedge_rows.csv";

/// Headline metrics for the latest bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub spot: f64,
    pub spot_change: f64,
    pub sma: f64,
    pub window: usize,
    pub buffer_pct: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub regime: Regime,
    pub action: HedgeAction,
    pub hedge_status: &'static str,
    pub distance_pct: f64,
    /// "Buffer to Bear" or "Buffer to Bull"
    pub buffer_label: String,
    pub buffer_value: f64,
    pub hedged_pct: f64,
    pub transitions: usize,
    pub freshness: Freshness,
    pub generated_at: DateTime<Utc>,
}

/// Transition marker on the price chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub date: NaiveDate,
    pub price: f64,
}

/// Column-oriented chart data, one entry per evaluated bar
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub sma: Vec<f64>,
    pub upper_band: Vec<f64>,
    pub lower_band: Vec<f64>,
    /// Hedge entries (OPEN_HEDGE)
    pub open_markers: Vec<Marker>,
    /// Hedge exits (CLOSE_HEDGE)
    pub close_markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPayload {
    pub snapshot: DashboardSnapshot,
    pub chart: ChartSeries,
}

pub fn build_snapshot(symbol: &str, series: &HedgeSeries, freshness: Freshness) -> DashboardSnapshot {
    let signal = series.signal();
    let last = signal.latest;
    let stats = series.stats();
    let buffer_label = match last.regime {
        Regime::Bull => "Buffer to Bear",
        Regime::Bear => "Buffer to Bull",
    };

    DashboardSnapshot {
        symbol: symbol.to_string(),
        as_of: last.date,
        spot: last.close,
        spot_change: signal.spot_change(),
        sma: last.sma,
        window: series.params().window,
        buffer_pct: series.params().buffer_pct,
        upper_band: last.upper_band,
        lower_band: last.lower_band,
        regime: last.regime,
        action: last.action,
        hedge_status: last.regime.hedge_status(),
        distance_pct: last.distance_pct,
        buffer_label: buffer_label.to_string(),
        buffer_value: last.buffer_to_flip(),
        hedged_pct: stats.hedged_pct(),
        transitions: stats.transitions(),
        freshness,
        generated_at: Utc::now(),
    }
}

pub fn build_chart(series: &HedgeSeries) -> ChartSeries {
    let mut chart = ChartSeries::default();

    for row in series.rows() {
        chart.dates.push(row.date);
        chart.close.push(row.close);
        chart.sma.push(row.sma);
        chart.upper_band.push(row.upper_band);
        chart.lower_band.push(row.lower_band);

        let marker = Marker {
            date: row.date,
            price: row.close,
        };
        match row.action {
            HedgeAction::OpenHedge => chart.open_markers.push(marker),
            HedgeAction::CloseHedge => chart.close_markers.push(marker),
            HedgeAction::Hold => {}
        }
    }

    chart
}

pub fn build_payload(symbol: &str, series: &HedgeSeries, freshness: Freshness) -> DashboardPayload {
    DashboardPayload {
        snapshot: build_snapshot(symbol, series, freshness),
        chart: build_chart(series),
    }
}

/// Write `dashboard.json` and `hedge_rows.csv` into `dir`
pub fn write_dashboard(
    dir: impl AsRef<Path>,
    payload: &DashboardPayload,
    series: &HedgeSeries,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let json_path = dir.join(DASHBOARD_FILE);
    let json = serde_json::to_string_pretty(payload).context("Failed to serialize dashboard")?;
    fs::write(&json_path, json).with_context(|| format!("Failed to write {}", json_path.display()))?;

    save_hedge_rows(series.rows(), dir.join(ROWS_FILE))?;

    info!("Dashboard written to {}", dir.display());
    Ok(json_path)
}
