//! Check command - evaluate the latest bar and deliver the daily report

use anyhow::Result;
use chrono::Utc;
use fx_hedge::data::Freshness;
use fx_hedge::monitor::{run_check, CheckSettings};
use fx_hedge::notify::{ConsoleSink, NotificationSink, TelegramNotifier};
use fx_hedge::{HedgeEngine, HedgeSeries};
use tracing::info;

use super::{build_provider, Overrides};

pub fn run(overrides: Overrides, dry_run: bool) -> Result<()> {
    info!("Starting hedge check");

    let config = overrides.load_config()?;
    let secrets = config.secret_store();

    let sink: Box<dyn NotificationSink> = if dry_run {
        info!("Dry run: report goes to stdout");
        Box::new(ConsoleSink)
    } else {
        Box::new(TelegramNotifier::new(config.telegram_config(&secrets))?)
    };

    let rt = tokio::runtime::Runtime::new()?;
    let provider = build_provider(&config, &secrets)?;
    let engine = HedgeEngine::new(config.strategy)?;
    let settings = CheckSettings::from_config(&config);

    let outcome = rt.block_on(run_check(
        provider.as_ref(),
        sink.as_ref(),
        &engine,
        &settings,
        Utc::now().date_naive(),
    ))?;

    print_summary(&settings.symbol, &outcome.series, outcome.freshness);

    if !outcome.report_delivered {
        anyhow::bail!("Report not delivered via {}", sink.name());
    }

    Ok(())
}

fn print_summary(symbol: &str, series: &HedgeSeries, freshness: Freshness) {
    let last = series.latest();
    let stats = series.stats();

    println!("\n{}", "=".repeat(60));
    println!("HEDGE CHECK: {}", symbol);
    println!("{}", "=".repeat(60));
    println!("Date:               {}", last.date);
    println!("Close:              {:.5}", last.close);
    println!("SMA {:<15} {:.5}", format!("{}:", series.params().window), last.sma);
    println!("Upper Band:         {:.5}", last.upper_band);
    println!("Lower Band:         {:.5}", last.lower_band);
    println!("Distance:           {:+.2}%", last.distance_pct);
    println!("Regime:             {} ({})", last.regime, last.regime.hedge_status());
    println!("Action:             {}", last.action);
    println!("Hedged History:     {:.1}%", stats.hedged_pct());
    println!("Transitions:        {}", stats.transitions());
    if let Freshness::Stale { age_days } = freshness {
        println!("Data:               STALE ({} days old)", age_days);
    }
    println!("{}\n", "=".repeat(60));
}
