//! Markdown report and alert text
//!
//! Only the latest row and its predecessor go into the report body; the
//! footer adds the hedged share over the whole evaluated history.

use crate::data::Freshness;
use crate::error::FailureKind;
use crate::strategy::{HedgeSignal, HedgeStats};
use crate::{HedgeAction, HedgeParams, Regime};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━";
const DOUBLE_RULE: &str = "═══════════════════════";

/// Presentation options for reports
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    /// Display name of the pair, e.g. "EUR/USD"
    pub pair_label: String,
    pub dashboard_url: Option<String>,
    /// Deltas quoted in the collar instruction on OPEN_HEDGE
    pub put_delta: f64,
    pub call_delta: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "FX HEDGE MONITOR".to_string(),
            pair_label: "EUR/USD".to_string(),
            dashboard_url: None,
            put_delta: 0.25,
            call_delta: 0.35,
        }
    }
}

/// Format with thousands separators and a fixed number of decimals
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn trend_arrow(current: f64, previous: f64) -> &'static str {
    if current > previous {
        "↗️"
    } else if current < previous {
        "↘️"
    } else {
        "➡️"
    }
}

/// Build the daily report for the live signal
pub fn build_report(
    signal: &HedgeSignal,
    stats: &HedgeStats,
    params: &HedgeParams,
    freshness: Freshness,
    options: &ReportOptions,
) -> String {
    let last = &signal.latest;
    let change = signal.spot_change();
    let change_pct = signal.spot_change_pct();
    let change_sign = if change >= 0.0 { "+" } else { "" };
    let band = params.buffer_label();

    let mut msg = String::new();

    msg.push_str(&format!("{RULE}\n🛡️  *{}*\n      FX Hedging Report\n{RULE}\n", options.title));
    msg.push_str(&format!("\n📅 *{}*\n", last.date.format("%A, %d %B %Y")));
    if let Freshness::Stale { age_days } = freshness {
        msg.push_str(&format!(
            "⚠️ _Stale data: latest bar is {} days old_\n",
            age_days
        ));
    }

    msg.push_str("\n📊 *MARKET*\n\n");
    msg.push_str(&format!(
        "💶 *{} Spot:*  `{}`\n",
        options.pair_label,
        format_number(last.close, 4)
    ));
    msg.push_str(&format!(
        "      {} {}{} ({}{:.2}%)\n\n",
        trend_arrow(last.close, signal.previous.close),
        change_sign,
        format_number(change, 4),
        change_sign,
        change_pct
    ));
    msg.push_str(&format!(
        "📈 *SMA {}:*  `{}`\n",
        params.window,
        format_number(last.sma, 4)
    ));
    msg.push_str(&format!("📐 *Distance:*  `{:+.2}%`\n", last.distance_pct));

    msg.push_str("\n📏 *HYSTERESIS BANDS*\n\n");
    msg.push_str(&format!(
        "🟢 Upper (+{}): `{}`\n",
        band,
        format_number(last.upper_band, 4)
    ));
    msg.push_str(&format!(
        "🔴 Lower (-{}):  `{}`\n",
        band,
        format_number(last.lower_band, 4)
    ));

    msg.push_str("\n📡 *STATE*\n\n");
    match last.regime {
        Regime::Bear => {
            msg.push_str("🔴 *Regime: BEAR*\n🛡️ Status: *HEDGED*\n");
            msg.push_str(&format!(
                "📍 Buffer → Bull: `{}`",
                format_number(last.buffer_to_flip(), 4)
            ));
        }
        Regime::Bull => {
            msg.push_str("🟢 *Regime: BULL*\n💤 Status: *UNHEDGED*\n");
            msg.push_str(&format!(
                "📍 Buffer → Bear: `{}`",
                format_number(last.buffer_to_flip(), 4)
            ));
        }
    }

    msg.push_str(&format!("\n\n{DOUBLE_RULE}\n"));
    match (last.action, last.regime) {
        (HedgeAction::OpenHedge, _) => {
            msg.push_str(&format!("🚨 *SIGNAL: OPEN HEDGE* 🚨\n{DOUBLE_RULE}\n\n"));
            msg.push_str("Put on a *COLLAR*:\n\n");
            msg.push_str(&format!(
                "   🔹 *BUY PUT* {}\n       Delta: {:.2}\n       Purpose: downside protection\n\n",
                options.pair_label, options.put_delta
            ));
            msg.push_str(&format!(
                "   🔸 *SELL CALL* {}\n       Delta: {:.2}\n       Purpose: premium financing\n",
                options.pair_label, options.call_delta
            ));
        }
        (HedgeAction::CloseHedge, _) => {
            msg.push_str(&format!("✅ *SIGNAL: CLOSE HEDGE* ✅\n{DOUBLE_RULE}\n\n"));
            msg.push_str("   📌 Close the option legs\n");
            msg.push_str("   📌 Return to *unhedged*\n");
        }
        (HedgeAction::Hold, Regime::Bear) => {
            msg.push_str(&format!("🛡️ *NO SIGNAL*\n{DOUBLE_RULE}\n\n"));
            msg.push_str("   ↳ Keep the hedge on\n");
            msg.push_str("   ↳ Collar stays in place\n");
        }
        (HedgeAction::Hold, Regime::Bull) => {
            msg.push_str(&format!("💤 *NO SIGNAL*\n{DOUBLE_RULE}\n\n"));
            msg.push_str("   ↳ Stay unhedged\n");
            msg.push_str("   ↳ No action required\n");
        }
    }

    msg.push_str(&format!("\n\n{RULE}\n"));
    msg.push_str(&format!(
        "📊 _History: {:.1}% of time hedged, {} transitions_\n",
        stats.hedged_pct(),
        stats.transitions()
    ));
    msg.push_str(RULE);
    if let Some(url) = &options.dashboard_url {
        msg.push_str(&format!("\n\n🔗 [Interactive dashboard]({})", url));
    }
    msg.push('\n');

    msg
}

/// Build an alert for a run that could not produce a trustworthy signal
///
/// `detail` is truncated to 200 characters.
pub fn build_alert(kind: FailureKind, detail: &str, options: &ReportOptions) -> String {
    let (headline, hint) = match kind {
        FailureKind::NoData => (
            "❌ No data: price history could not be loaded",
            "Check the API key and provider connectivity",
        ),
        FailureKind::StaleData => (
            "⏳ Stale data: the provider has not published recent bars",
            "Signals reflect the last published bar only",
        ),
        FailureKind::ComputationError => (
            "🧮 Computation error: the signal could not be evaluated",
            "Inspect the price history for gaps or bad values",
        ),
    };
    let detail: String = detail.chars().take(200).collect();

    format!(
        "{RULE}\n⚠️ *{}*\n      System Alert\n{RULE}\n\n{}\n\n```\n{}\n```\n\n_{}_\n",
        options.title, headline, detail, hint
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HedgeRow;
    use chrono::NaiveDate;

    fn row(date: u32, close: f64, regime: Regime, action: HedgeAction) -> HedgeRow {
        let sma = 1.1000;
        HedgeRow {
            date: NaiveDate::from_ymd_opt(2024, 3, date).unwrap(),
            close,
            sma,
            upper_band: sma * 1.01,
            lower_band: sma * 0.99,
            distance_pct: (close - sma) / sma * 100.0,
            regime,
            action,
        }
    }

    fn stats() -> HedgeStats {
        HedgeStats {
            rows: 200,
            hedged_rows: 50,
            open_count: 3,
            close_count: 2,
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.08768, 4), "1.0877");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-0.00124, 4), "-0.0012");
        assert_eq!(format_number(-0.00001, 4), "0.0000");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
    }

    #[test]
    fn test_open_hedge_report() {
        let signal = HedgeSignal {
            previous: row(14, 1.0900, Regime::Bull, HedgeAction::Hold),
            latest: row(15, 1.0850, Regime::Bear, HedgeAction::OpenHedge),
        };
        let options = ReportOptions {
            dashboard_url: Some("https://example.org/fx".to_string()),
            ..ReportOptions::default()
        };
        let text = build_report(
            &signal,
            &stats(),
            &HedgeParams::default(),
            Freshness::Fresh,
            &options,
        );

        assert!(text.contains("Friday, 15 March 2024"));
        assert!(text.contains("*EUR/USD Spot:*  `1.0850`"));
        assert!(text.contains("↘️ -0.0050 (-0.46%)"));
        assert!(text.contains("*SMA 200:*  `1.1000`"));
        assert!(text.contains("Upper (+1%): `1.1110`"));
        assert!(text.contains("*Regime: BEAR*"));
        assert!(text.contains("Buffer → Bull: `0.0260`"));
        assert!(text.contains("SIGNAL: OPEN HEDGE"));
        assert!(text.contains("Delta: 0.25"));
        assert!(text.contains("25.0% of time hedged, 5 transitions"));
        assert!(text.contains("(https://example.org/fx)"));
        assert!(!text.contains("Stale data"));
    }

    #[test]
    fn test_hold_report_wording_follows_regime() {
        let bull = HedgeSignal {
            previous: row(14, 1.1050, Regime::Bull, HedgeAction::Hold),
            latest: row(15, 1.1050, Regime::Bull, HedgeAction::Hold),
        };
        let text = build_report(
            &bull,
            &stats(),
            &HedgeParams::default(),
            Freshness::Stale { age_days: 6 },
            &ReportOptions::default(),
        );
        assert!(text.contains("➡️ +0.0000 (+0.00%)"));
        assert!(text.contains("Stay unhedged"));
        assert!(text.contains("Buffer → Bear"));
        assert!(text.contains("latest bar is 6 days old"));
        assert!(!text.contains("Interactive dashboard"));
    }

    #[test]
    fn test_alert_distinguishes_kinds() {
        let opts = ReportOptions::default();
        let no_data = build_alert(FailureKind::NoData, "503 Service Unavailable", &opts);
        let stale = build_alert(FailureKind::StaleData, "last bar 2024-03-01", &opts);
        let failed = build_alert(FailureKind::ComputationError, "duplicate date", &opts);

        assert!(no_data.contains("No data"));
        assert!(stale.contains("Stale data"));
        assert!(failed.contains("Computation error"));

        let long = "x".repeat(500);
        let text = build_alert(FailureKind::NoData, &long, &opts);
        assert!(text.contains(&"x".repeat(200)));
        assert!(!text.contains(&"x".repeat(201)));
    }
}
