//! FX hedge engine - main entry point
//!
//! This binary provides three subcommands:
//! - check: Evaluate the latest bar and send the daily report
//! - dashboard: Write the dashboard payload and hedge rows
//! - download: Save price history to CSV

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::Overrides;

#[derive(Parser, Debug)]
#[command(name = "fx-hedge")]
#[command(about = "SMA hysteresis hedge signals for FX spot exposure", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Flags shared by every subcommand
#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Provider ticker (overrides config file). E.g., "EURUSD.FOREX"
    #[arg(short, long)]
    symbol: Option<String>,

    /// Moving average window in bars
    #[arg(long)]
    window: Option<usize>,

    /// Hysteresis buffer as a fraction. E.g., 0.01 for ±1%
    #[arg(long)]
    buffer: Option<f64>,

    /// Read history from {csv_dir}/{symbol}.csv instead of the API
    #[arg(long)]
    csv_dir: Option<String>,
}

impl From<CommonArgs> for Overrides {
    fn from(args: CommonArgs) -> Self {
        Overrides {
            config_path: args.config,
            symbol: args.symbol,
            window: args.window,
            buffer: args.buffer,
            csv_dir: args.csv_dir,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the latest bar and send the report
    Check {
        #[command(flatten)]
        common: CommonArgs,

        /// Print the report instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Write dashboard.json and hedge_rows.csv
    Dashboard {
        #[command(flatten)]
        common: CommonArgs,

        /// Output directory (overrides config file)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Download price history to CSV
    Download {
        #[command(flatten)]
        common: CommonArgs,

        /// Calendar days of history to fetch (overrides config file)
        #[arg(short, long)]
        days: Option<u32>,

        /// Output directory
        #[arg(short, long, default_value = "data")]
        output: String,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Filter out noisy HTTP crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Check { .. } => "check",
        Commands::Dashboard { .. } => "dashboard",
        Commands::Download { .. } => "download",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Check { common, dry_run } => commands::check::run(common.into(), dry_run),
        Commands::Dashboard { common, output } => commands::dashboard::run(common.into(), output),
        Commands::Download {
            common,
            days,
            output,
        } => commands::download::run(common.into(), days, output),
    }
}
