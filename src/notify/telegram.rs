//! Telegram Bot API sink

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::NotificationSink;

/// Base URL for the Telegram Bot API
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram credentials and endpoint
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            base_url: TELEGRAM_API_BASE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl TelegramConfig {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            bot_token,
            chat_id,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.bot_token.as_deref().filter(|t| !t.is_empty())?;
        let chat = self.chat_id.as_deref().filter(|c| !c.is_empty())?;
        Some((token, chat))
    }
}

/// Sends Markdown messages through `sendMessage`
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn is_configured(&self) -> bool {
        self.config.credentials().is_some()
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, text: &str) -> bool {
        let Some((token, chat_id)) = self.config.credentials() else {
            warn!("Telegram bot token or chat id missing, message not sent");
            return false;
        };

        let url = format!("{}/bot{}/sendMessage", self.config.base_url, token);
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        debug!("Sending Telegram message ({} chars)", text.chars().count());

        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("Telegram message delivered");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!("Telegram API error {}: {}", status, body);
                false
            }
            Err(e) => {
                // the URL embeds the bot token
                error!("Failed to send Telegram message: {}", e.without_url());
                false
            }
        }
    }
}
