//! Dashboard command - write the chart payload and hedge rows

use anyhow::Result;
use fx_hedge::dashboard::{build_payload, write_dashboard};
use fx_hedge::HedgeEngine;
use tracing::{info, warn};

use super::{assess_freshness, build_provider, fetch_history, Overrides};

pub fn run(overrides: Overrides, output_override: Option<String>) -> Result<()> {
    info!("Building dashboard");

    let mut config = overrides.load_config()?;
    if let Some(output) = output_override {
        info!("Overriding output directory to: {}", output);
        config.output.dashboard_dir = output;
    }

    let secrets = config.secret_store();
    let rt = tokio::runtime::Runtime::new()?;
    let provider = build_provider(&config, &secrets)?;
    let engine = HedgeEngine::new(config.strategy)?;

    let bars = fetch_history(&rt, provider.as_ref(), &config)?;
    let freshness = assess_freshness(&bars, &config);
    if freshness.is_stale() {
        warn!("Dashboard built from stale data: {:?}", freshness);
    }

    let series = engine.evaluate(&bars)?;
    let payload = build_payload(&config.market.symbol, &series, freshness);
    let path = write_dashboard(&config.output.dashboard_dir, &payload, &series)?;

    let snap = &payload.snapshot;
    println!("\n{}", "=".repeat(60));
    println!("DASHBOARD: {}", snap.symbol);
    println!("{}", "=".repeat(60));
    println!("As Of:              {}", snap.as_of);
    println!("Spot:               {:.5} ({:+.5})", snap.spot, snap.spot_change);
    println!("SMA {:<15} {:.5}", format!("{}:", snap.window), snap.sma);
    println!("Regime:             {} ({})", snap.regime, snap.hedge_status);
    println!("{:<20}{:.5}", format!("{}:", snap.buffer_label), snap.buffer_value);
    println!("Hedged History:     {:.1}%", snap.hedged_pct);
    println!("Transitions:        {}", snap.transitions);
    println!("Open Markers:       {}", payload.chart.open_markers.len());
    println!("Close Markers:      {}", payload.chart.close_markers.len());
    println!("Written To:         {}", path.display());
    println!("{}\n", "=".repeat(60));

    Ok(())
}
