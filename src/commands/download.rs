//! Download command - save provider history as `{output}/{symbol}.csv`

use anyhow::Result;
use fx_hedge::data::save_csv;
use tracing::info;

use super::{build_provider, fetch_history, Overrides};

pub fn run(overrides: Overrides, days: Option<u32>, output: String) -> Result<()> {
    let mut config = overrides.load_config()?;
    if let Some(days) = days {
        config.market.lookback_days = days;
    }

    info!("Starting download of {}", config.market.symbol);

    println!("\n{}", "=".repeat(60));
    println!("DOWNLOADING PRICE HISTORY");
    println!("{}", "=".repeat(60));
    println!("  Symbol:   {}", config.market.symbol);
    println!("  Days:     {}", config.market.lookback_days);
    println!("  Output:   {}", output);
    println!("{}\n", "=".repeat(60));

    let secrets = config.secret_store();
    let rt = tokio::runtime::Runtime::new()?;
    let provider = build_provider(&config, &secrets)?;

    let bars = fetch_history(&rt, provider.as_ref(), &config)?;
    let path = save_csv(&bars, &output, &config.market.symbol)?;

    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => println!(
            "✓ {} bars ({} to {}) saved to {}",
            bars.len(),
            first.date,
            last.date,
            path.display()
        ),
        _ => println!("✗ Provider returned no bars for {}", config.market.symbol),
    }

    Ok(())
}
