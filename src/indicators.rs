//! Technical indicators
//!
//! Trailing simple moving average and the hysteresis bands built around it.
//! Everything here is a pure function of its inputs.

use crate::{HedgeParams, IndicatorRow, PriceBar};

/// Calculate Simple Moving Average
///
/// `result[i]` is the mean of `values[i + 1 - period..=i]`, or `None` while
/// fewer than `period` values are available.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());

    if period == 0 {
        result.resize(values.len(), None);
        return result;
    }

    for i in 0..values.len() {
        if i + 1 < period {
            result.push(None);
        } else {
            let sum: f64 = values[i + 1 - period..=i].iter().sum();
            result.push(Some(sum / period as f64));
        }
    }

    result
}

/// Upper and lower hysteresis band for a moving average value
pub fn hysteresis_bands(sma: f64, buffer_pct: f64) -> (f64, f64) {
    (sma * (1.0 + buffer_pct), sma * (1.0 - buffer_pct))
}

/// Distance of close from the moving average, in percent
pub fn distance_pct(close: f64, sma: f64) -> f64 {
    (close - sma) / sma * 100.0
}

/// Build indicator rows for a chronological price series
///
/// The first `window - 1` bars have no moving average and are dropped, so
/// the output holds `bars.len() - window + 1` rows, or none at all when
/// `bars.len() < window`. An empty result means insufficient history.
pub fn compute_indicators(bars: &[PriceBar], params: &HedgeParams) -> Vec<IndicatorRow> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let averages = sma(&closes, params.window);

    bars.iter()
        .zip(averages)
        .filter_map(|(bar, avg)| {
            let avg = avg?;
            let (upper_band, lower_band) = hysteresis_bands(avg, params.buffer_pct);
            Some(IndicatorRow {
                date: bar.date,
                close: bar.close,
                sma: avg,
                upper_band,
                lower_band,
                distance_pct: distance_pct(bar.close, avg),
            })
        })
        .collect()
}
