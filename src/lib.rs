//! FX Spot Hedge Engine
//!
//! Daily regime filter for an FX spot exposure: a simple moving average with
//! symmetric hysteresis bands drives a BULL/BEAR state machine that emits
//! OPEN_HEDGE, CLOSE_HEDGE or HOLD for each bar. Price history, report
//! delivery and the dashboard export sit behind small collaborator modules.

pub mod config;
pub mod dashboard;
pub mod data;
pub mod eodhd;
pub mod error;
pub mod indicators;
pub mod monitor;
pub mod notify;
pub mod provider;
pub mod strategy;
pub mod types;

pub use config::Config;
pub use error::{FailureKind, HedgeError, HedgeResult, MalformedInput};
pub use provider::{CsvHistoryProvider, PriceHistoryProvider};
pub use strategy::{HedgeEngine, HedgeSeries, HedgeSignal, HedgeStats};
pub use types::*;
