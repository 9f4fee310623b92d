//! Notification delivery and report formatting
//!
//! The engine hands over a finished text payload; sinks deliver it and
//! report success. Delivery is never retried here, a failed send is logged
//! and returned to the caller.

pub mod report;
mod telegram;

use async_trait::async_trait;

pub use report::{build_alert, build_report, format_number, ReportOptions};
pub use telegram::{TelegramConfig, TelegramNotifier, TELEGRAM_API_BASE};

/// Destination for formatted reports
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver `text`; returns whether the destination accepted it
    async fn send(&self, text: &str) -> bool;
}

/// Prints reports to stdout, used for dry runs
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, text: &str) -> bool {
        println!("{}", text);
        true
    }
}
