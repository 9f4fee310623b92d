//! Daily check: fetch, evaluate, report, deliver
//!
//! Works against the collaborator traits only, so the binary passes the
//! configured provider and sink and tests pass in-memory ones.

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::data::Freshness;
use crate::error::{FailureKind, HedgeResult};
use crate::notify::{build_alert, build_report, NotificationSink, ReportOptions};
use crate::provider::PriceHistoryProvider;
use crate::strategy::{HedgeEngine, HedgeSeries};

/// Inputs of one check run besides the collaborators
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub symbol: String,
    pub lookback_days: u32,
    pub max_staleness_days: i64,
    pub report: ReportOptions,
}

impl CheckSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            symbol: config.market.symbol.clone(),
            lookback_days: config.market.lookback_days,
            max_staleness_days: config.market.max_staleness_days,
            report: config.report_options(),
        }
    }
}

/// Result of a run that produced a signal
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub series: HedgeSeries,
    pub freshness: Freshness,
    /// Whether the sink accepted the daily report
    pub report_delivered: bool,
}

/// Run the daily check once
///
/// Fetch and evaluation failures are alerted through `sink` with the
/// error's category and then returned. A stale series is still evaluated;
/// a stale-data alert goes out ahead of the report.
pub async fn run_check(
    provider: &dyn PriceHistoryProvider,
    sink: &dyn NotificationSink,
    engine: &HedgeEngine,
    settings: &CheckSettings,
    today: NaiveDate,
) -> HedgeResult<CheckOutcome> {
    info!("Checking {} via {}", settings.symbol, provider.name());

    let evaluated = match provider.fetch(&settings.symbol, settings.lookback_days).await {
        Ok(bars) => engine.evaluate(&bars),
        Err(e) => Err(e),
    };

    let series = match evaluated {
        Ok(series) => series,
        Err(e) => {
            error!("Hedge check failed: {}", e);
            let alert = build_alert(e.category(), &e.to_string(), &settings.report);
            deliver(sink, &alert).await;
            return Err(e);
        }
    };

    let last_date = series.latest().date;
    let freshness = Freshness::assess(last_date, today, settings.max_staleness_days);

    if let Freshness::Stale { age_days } = freshness {
        warn!("Latest bar is {} days old", age_days);
        let detail = format!(
            "{}: last bar {} is {} days old",
            settings.symbol, last_date, age_days
        );
        let alert = build_alert(FailureKind::StaleData, &detail, &settings.report);
        deliver(sink, &alert).await;
    }

    let report = build_report(
        &series.signal(),
        &series.stats(),
        series.params(),
        freshness,
        &settings.report,
    );
    let report_delivered = deliver(sink, &report).await;

    Ok(CheckOutcome {
        series,
        freshness,
        report_delivered,
    })
}

async fn deliver(sink: &dyn NotificationSink, text: &str) -> bool {
    let sent = sink.send(text).await;
    if sent {
        info!("Message sent via {}", sink.name());
    } else {
        error!("Failed to send message via {}", sink.name());
    }
    sent
}
