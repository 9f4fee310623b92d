//! Hysteresis hedge state machine
//!
//! Two regimes, Bull (unhedged) and Bear (hedged). The regime only flips
//! when the close crosses the band on the far side of the moving average:
//! Bull needs a close below the lower band to turn Bear, Bear needs a close
//! above the upper band to turn Bull. Inside the band the previous regime is
//! held, which is what suppresses whipsaw around the average.
//!
//! The regime at bar T is a function of the regime at T-1, so the run is a
//! strict sequential fold over the series. Band levels are computed in bulk
//! up front by [`crate::indicators`]; the fold itself must stay sequential.

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::data::validate_bars;
use crate::error::{HedgeError, HedgeResult};
use crate::indicators::compute_indicators;
use crate::{HedgeAction, HedgeParams, HedgeRow, IndicatorRow, PriceBar, Regime};

/// Regime for the first row of a series
///
/// No prior regime exists to hold over, so the bare moving average decides:
/// strictly above is Bull, anything else (equality included) is Bear.
pub fn initial_regime(row: &IndicatorRow) -> Regime {
    if row.close > row.sma {
        Regime::Bull
    } else {
        Regime::Bear
    }
}

/// One step of the transition table
///
/// Crossings are strict, so a close exactly on a band never flips.
pub fn next_regime(current: Regime, row: &IndicatorRow) -> Regime {
    match current {
        Regime::Bull if row.close < row.lower_band => Regime::Bear,
        Regime::Bull => Regime::Bull,
        Regime::Bear if row.close > row.upper_band => Regime::Bull,
        Regime::Bear => Regime::Bear,
    }
}

/// Action implied by moving from `previous` to `next`
pub fn action_for(previous: Regime, next: Regime) -> HedgeAction {
    match (previous, next) {
        (Regime::Bull, Regime::Bear) => HedgeAction::OpenHedge,
        (Regime::Bear, Regime::Bull) => HedgeAction::CloseHedge,
        (Regime::Bull, Regime::Bull) | (Regime::Bear, Regime::Bear) => HedgeAction::Hold,
    }
}

/// Run the state machine over a chronological indicator series
///
/// Returns one [`HedgeRow`] per input row. The first row is seeded with
/// [`initial_regime`] and then goes through the same transition step as
/// every other row, which always yields Hold for it.
pub fn run_state_machine(rows: &[IndicatorRow]) -> HedgeResult<Vec<HedgeRow>> {
    let first = match rows {
        [first, _, ..] => first,
        _ => {
            return Err(HedgeError::InsufficientHistory {
                required: 2,
                available: rows.len(),
            })
        }
    };

    let mut regime = initial_regime(first);
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let previous = regime;
        regime = next_regime(previous, row);
        let action = action_for(previous, regime);

        if action.is_transition() {
            debug!(
                "{}: {} -> {} ({}) close={:.5} bands=[{:.5}, {:.5}]",
                row.date, previous, regime, action, row.close, row.lower_band, row.upper_band
            );
        }

        out.push(HedgeRow::from_indicator(row, regime, action));
    }

    Ok(out)
}

/// Latest bar and its predecessor, the payload for live reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HedgeSignal {
    pub latest: HedgeRow,
    pub previous: HedgeRow,
}

impl HedgeSignal {
    pub fn spot_change(&self) -> f64 {
        self.latest.close - self.previous.close
    }

    pub fn spot_change_pct(&self) -> f64 {
        self.spot_change() / self.previous.close * 100.0
    }
}

/// Summary statistics over a full hedge series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HedgeStats {
    pub rows: usize,
    pub hedged_rows: usize,
    pub open_count: usize,
    pub close_count: usize,
}

impl HedgeStats {
    pub fn transitions(&self) -> usize {
        self.open_count + self.close_count
    }

    /// Share of bars spent hedged, in percent
    pub fn hedged_pct(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        self.hedged_rows as f64 / self.rows as f64 * 100.0
    }
}

/// Full evaluated series; always holds at least two rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HedgeSeries {
    params: HedgeParams,
    rows: Vec<HedgeRow>,
}

impl HedgeSeries {
    pub fn params(&self) -> &HedgeParams {
        &self.params
    }

    pub fn rows(&self) -> &[HedgeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> &HedgeRow {
        &self.rows[self.rows.len() - 1]
    }

    pub fn previous(&self) -> &HedgeRow {
        &self.rows[self.rows.len() - 2]
    }

    pub fn signal(&self) -> HedgeSignal {
        HedgeSignal {
            latest: *self.latest(),
            previous: *self.previous(),
        }
    }

    pub fn stats(&self) -> HedgeStats {
        let actions = self.rows.iter().map(|r| r.action).counts();
        HedgeStats {
            rows: self.rows.len(),
            hedged_rows: self.rows.iter().filter(|r| r.regime.is_hedged()).count(),
            open_count: actions.get(&HedgeAction::OpenHedge).copied().unwrap_or(0),
            close_count: actions.get(&HedgeAction::CloseHedge).copied().unwrap_or(0),
        }
    }

    /// Rows where the regime flipped
    pub fn transitions(&self) -> impl Iterator<Item = &HedgeRow> {
        self.rows.iter().filter(|r| r.action.is_transition())
    }
}

/// Indicator engine plus state machine behind one entry point
#[derive(Debug, Clone, Copy, Default)]
pub struct HedgeEngine {
    params: HedgeParams,
}

impl HedgeEngine {
    pub fn new(params: HedgeParams) -> HedgeResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &HedgeParams {
        &self.params
    }

    /// Evaluate the full price history from scratch
    ///
    /// Rejects malformed series, then requires one full window plus one bar
    /// so the state machine has at least two rows to walk.
    pub fn evaluate(&self, bars: &[PriceBar]) -> HedgeResult<HedgeSeries> {
        self.params.validate()?;
        validate_bars(bars)?;

        let required = self.params.required_bars();
        if bars.len() < required {
            return Err(HedgeError::InsufficientHistory {
                required,
                available: bars.len(),
            });
        }

        let indicators = compute_indicators(bars, &self.params);
        let rows = run_state_machine(&indicators)?;

        debug!(
            "Evaluated {} bars into {} hedge rows (window={}, buffer={})",
            bars.len(),
            rows.len(),
            self.params.window,
            self.params.buffer_pct
        );

        Ok(HedgeSeries {
            params: self.params,
            rows,
        })
    }
}
