//! EODHD end-of-day API types

use serde::{Deserialize, Serialize};

use crate::data::parse_date;
use crate::error::{HedgeResult, MalformedInput};
use crate::PriceBar;

/// One row of the `/eod/{ticker}` JSON response
///
/// Forex tickers report `adjusted_close` equal to `close`; the adjusted
/// value is preferred when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EodBar {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub adjusted_close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl EodBar {
    /// Convert to a [`PriceBar`]; `row` is the 0-based position in the response
    pub fn to_price_bar(&self, row: usize) -> Result<PriceBar, MalformedInput> {
        let raw_date = self
            .date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(MalformedInput::MissingField { row, field: "date" })?;
        let date = parse_date(raw_date).ok_or_else(|| MalformedInput::InvalidField {
            row,
            field: "date",
            value: raw_date.to_string(),
        })?;
        let close = self
            .adjusted_close
            .or(self.close)
            .ok_or(MalformedInput::MissingField {
                row,
                field: "adjusted_close",
            })?;
        Ok(PriceBar::new(date, close))
    }
}

/// Convert a full response into ascending price bars
pub fn to_price_bars(rows: &[EodBar]) -> HedgeResult<Vec<PriceBar>> {
    let mut bars = rows
        .iter()
        .enumerate()
        .map(|(i, r)| r.to_price_bar(i))
        .collect::<Result<Vec<_>, _>>()?;
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HedgeError;

    #[test]
    fn test_parse_response() {
        let json = r#"[
            {"date":"2024-01-03","open":1.0922,"high":1.0940,"low":1.0893,"close":1.0921,"adjusted_close":1.0920,"volume":0},
            {"date":"2024-01-02","open":1.1040,"high":1.1046,"low":1.0936,"close":1.1039,"adjusted_close":1.1039,"volume":0}
        ]"#;
        let rows: Vec<EodBar> = serde_json::from_str(json).unwrap();
        let bars = to_price_bars(&rows).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date.to_string(), "2024-01-02");
        assert_eq!(bars[1].close, 1.0920);
    }

    #[test]
    fn test_falls_back_to_close() {
        let json = r#"[{"date":"2024-01-02","close":1.1039}]"#;
        let rows: Vec<EodBar> = serde_json::from_str(json).unwrap();
        assert_eq!(to_price_bars(&rows).unwrap()[0].close, 1.1039);
    }

    #[test]
    fn test_missing_date_is_malformed() {
        let json = r#"[{"date":"2024-01-02","close":1.1039},{"close":1.1}]"#;
        let rows: Vec<EodBar> = serde_json::from_str(json).unwrap();
        assert_eq!(
            to_price_bars(&rows),
            Err(HedgeError::MalformedInput(MalformedInput::MissingField {
                row: 1,
                field: "date"
            }))
        );
    }

    #[test]
    fn test_missing_price_is_malformed() {
        let json = r#"[{"date":"2024-01-02","close":null,"adjusted_close":null}]"#;
        let rows: Vec<EodBar> = serde_json::from_str(json).unwrap();
        assert!(matches!(
            to_price_bars(&rows),
            Err(HedgeError::MalformedInput(MalformedInput::MissingField { row: 0, .. }))
        ));
    }
}
