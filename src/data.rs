//! Price history loading and validation
//!
//! CSV files use a `date,close` header with one daily bar per row. Every
//! series entering the engine goes through [`validate_bars`] first.

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use itertools::Itertools;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{HedgeError, HedgeResult, MalformedInput};
use crate::{HedgeRow, PriceBar};

/// Reject series the state machine cannot walk safely
///
/// Checks every close is finite and positive and that dates strictly
/// increase (which also rules out duplicates).
pub fn validate_bars(bars: &[PriceBar]) -> Result<(), MalformedInput> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() {
            return Err(MalformedInput::NonFiniteClose {
                index,
                date: bar.date,
            });
        }
        if bar.close <= 0.0 {
            return Err(MalformedInput::NonPositiveClose {
                index,
                date: bar.date,
                close: bar.close,
            });
        }
    }

    for (index, (prev, cur)) in bars.iter().tuple_windows().enumerate() {
        let index = index + 1;
        if cur.date == prev.date {
            return Err(MalformedInput::DuplicateDate {
                index,
                date: cur.date,
            });
        }
        if cur.date < prev.date {
            return Err(MalformedInput::NonMonotonicDate {
                index,
                previous: prev.date,
                current: cur.date,
            });
        }
    }

    Ok(())
}

/// Parse a date string (YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or RFC 3339)
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let s = date_str.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| s.parse::<DateTime<Utc>>().ok().map(|dt| dt.date_naive()))
}

/// Load daily bars from a `date,close` CSV file
///
/// A missing file is `DataUnavailable`; unreadable rows are `MalformedInput`.
/// The result is validated before it is returned.
pub fn load_csv(path: impl AsRef<Path>) -> HedgeResult<Vec<PriceBar>> {
    let path = path.as_ref();
    // flexible so short rows reach the per-field checks below
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| HedgeError::unavailable(format!("cannot open {}: {}", path.display(), e)))?;

    let mut bars = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        // +2 for 1-indexed rows and the header line
        let row = row_idx + 2;
        let record = result.map_err(|e| {
            if e.is_io_error() {
                HedgeError::unavailable(format!(
                    "failed to read row {} of {}: {}",
                    row,
                    path.display(),
                    e
                ))
            } else {
                MalformedInput::InvalidField {
                    row,
                    field: "record",
                    value: e.to_string(),
                }
                .into()
            }
        })?;

        let date_str = record
            .get(0)
            .filter(|s| !s.trim().is_empty())
            .ok_or(MalformedInput::MissingField { row, field: "date" })?;
        let date = parse_date(date_str).ok_or_else(|| MalformedInput::InvalidField {
            row,
            field: "date",
            value: date_str.to_string(),
        })?;

        let close_str = record
            .get(1)
            .filter(|s| !s.trim().is_empty())
            .ok_or(MalformedInput::MissingField { row, field: "close" })?;
        let close: f64 = close_str
            .trim()
            .parse()
            .map_err(|_| MalformedInput::InvalidField {
                row,
                field: "close",
                value: close_str.to_string(),
            })?;

        bars.push(PriceBar::new(date, close));
    }

    validate_bars(&bars)?;
    debug!("Loaded {} bars from {}", bars.len(), path.display());

    Ok(bars)
}

/// Write daily bars to `{dir}/{name}.csv`
pub fn save_csv(bars: &[PriceBar], dir: impl AsRef<Path>, name: &str) -> anyhow::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.csv", name));

    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for bar in bars {
        writer.serialize(bar).context("Failed to write bar")?;
    }
    writer.flush()?;

    info!("Saved {} bars to {}", bars.len(), path.display());
    Ok(path)
}

/// Write the evaluated series, one row per bar, to a CSV file
pub fn save_hedge_rows(rows: &[HedgeRow], path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("Failed to write hedge row")?;
    }
    writer.flush()?;
    Ok(())
}

/// Age check for the newest bar of a fetched series
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Stale { age_days: i64 },
}

impl Freshness {
    /// Stale when the last bar is more than `max_age_days` calendar days old
    pub fn assess(last_bar: NaiveDate, today: NaiveDate, max_age_days: i64) -> Self {
        let age_days = (today - last_bar).num_days();
        if age_days > max_age_days {
            Freshness::Stale { age_days }
        } else {
            Freshness::Fresh
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale { .. })
    }
}

/// Filter bars by an inclusive date range
pub fn filter_bars_by_date(
    bars: Vec<PriceBar>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<PriceBar> {
    bars.into_iter()
        .filter(|b| {
            let after_start = start.map_or(true, |s| b.date >= s);
            let before_end = end.map_or(true, |e| b.date <= e);
            after_start && before_end
        })
        .collect()
}

/// Keep the bars within `days` calendar days of the newest bar
pub fn trim_to_lookback(bars: Vec<PriceBar>, days: u32) -> Vec<PriceBar> {
    let Some(last) = bars.last().map(|b| b.date) else {
        return bars;
    };
    let start = last - Duration::days(i64::from(days));
    filter_bars_by_date(bars, Some(start), None)
}
