//! Telegram Bot API notification transport.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::TelegramConfig;
use crate::models::signal::{Direction, SignalVote, VoteBreakdown};
use crate::services::notifier::NotificationTransport;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram bot token or chat id not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram api rejected message ({status}): {description}")]
    Api { status: u16, description: String },
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Public view of the transport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramStatus {
    pub configured: bool,
    /// Chat id with everything past the first three characters hidden.
    pub chat_id: Option<String>,
}

pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_timeout(config: TelegramConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self::with_client(config, client)
    }

    pub fn with_client(config: TelegramConfig, client: Client) -> Self {
        if !config.is_configured() {
            warn!("Telegram bot token or chat id missing; notifications are disabled");
        }
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn status(&self) -> TelegramStatus {
        TelegramStatus {
            configured: self.is_configured(),
            chat_id: self.config.chat_id.as_deref().map(mask_chat_id),
        }
    }

    /// Post `text` to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(chat_id)) = (&self.config.bot_token, &self.config.chat_id) else {
            return Err(NotifyError::NotConfigured);
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            token
        );
        let response = self
            .client
            .post(url)
            .json(&SendMessageRequest {
                chat_id,
                text,
                parse_mode: "Markdown",
            })
            .send()
            .await?;

        let status = response.status();
        let body: Option<SendMessageResponse> = response.json().await.ok();
        match body {
            Some(body) if status.is_success() && body.ok => Ok(()),
            body => Err(NotifyError::Api {
                status: status.as_u16(),
                description: body
                    .and_then(|b| b.description)
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    /// Send a fixed message to verify the bot token and chat id.
    pub async fn send_test_notification(&self) -> bool {
        let text = format!(
            "✅ *Confluence test notification*\n\nTelegram delivery is working.\n\n🕐 {}",
            format_timestamp(Utc::now())
        );
        match self.send_message(&text).await {
            Ok(()) => {
                info!("Telegram test notification sent");
                true
            }
            Err(NotifyError::NotConfigured) => {
                warn!("Telegram not configured; test notification skipped");
                false
            }
            Err(e) => {
                error!(error = %e, "Telegram test notification failed");
                false
            }
        }
    }
}

#[async_trait]
impl NotificationTransport for TelegramNotifier {
    async fn notify(
        &self,
        symbol: &str,
        direction: Direction,
        strength: u8,
        votes: &VoteBreakdown,
    ) -> bool {
        if !self.is_configured() {
            warn!(symbol = %symbol, "Telegram not configured; signal for {} not sent", symbol);
            return false;
        }

        let text = format_signal_message(symbol, direction, strength, votes, Utc::now());
        match self.send_message(&text).await {
            Ok(()) => {
                info!(symbol = %symbol, direction = %direction, strength, "Telegram notification sent");
                true
            }
            Err(e) => {
                error!(symbol = %symbol, error = %e, "Telegram notification failed for {}", symbol);
                false
            }
        }
    }
}

/// Markdown body for a signal notification.
pub fn format_signal_message(
    symbol: &str,
    direction: Direction,
    strength: u8,
    votes: &VoteBreakdown,
    at: DateTime<Utc>,
) -> String {
    let (icon, label) = match direction {
        Direction::Call => ("🟢", "BUY"),
        Direction::Put => ("🔴", "SELL"),
        Direction::Abstain => ("⚪", "NO"),
    };
    let stars = "⭐".repeat(strength as usize);

    format!(
        "{icon} *{label} SIGNAL* | {symbol}\n\
         Strength: {strength}/4 {stars}\n\n\
         📊 *Indicators*\n\
         • EMA 9/21: {ema}\n\
         • RSI 14: {rsi}\n\
         • Bollinger 20: {bollinger}\n\
         • MACD 12/26/9: {macd}\n\
         • Trend EMA 50: {trend}\n\n\
         🕐 {time}",
        ema = vote_label(votes.ema),
        rsi = vote_label(votes.rsi),
        bollinger = vote_label(votes.bollinger),
        macd = vote_label(votes.macd),
        trend = vote_label(votes.trend),
        time = format_timestamp(at),
    )
}

fn vote_label(vote: SignalVote) -> &'static str {
    match vote {
        SignalVote::Call => "⬆️ CALL",
        SignalVote::Put => "⬇️ PUT",
        SignalVote::Neutral => "➖ NEUTRAL",
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn mask_chat_id(chat_id: &str) -> String {
    let visible: String = chat_id.chars().take(3).collect();
    format!("{}***", visible)
}
