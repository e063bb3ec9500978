//! Environment-driven configuration.
//!
//! Variables are read once at startup (after `dotenvy` has loaded an optional
//! `.env`). Unparsable numbers fall back to their defaults.

use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ANALYSIS_INTERVAL_SECONDS: u64 = 300;
pub const DEFAULT_WARM_START_DELAY_SECONDS: u64 = 10;
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_NOTIFY_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_MARKET_DATA_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Deployment environment name, `sandbox` unless `ENVIRONMENT` says otherwise.
pub fn get_environment() -> String {
    env_str("ENVIRONMENT", "sandbox")
}

pub fn is_production() -> bool {
    matches!(get_environment().as_str(), "production" | "prod")
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env_str("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
            bot_token: env_opt("TELEGRAM_BOT_TOKEN"),
            chat_id: env_opt("TELEGRAM_CHAT_ID"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub port: u16,
    /// Seconds between scheduled analysis cycles (0 = scheduler disabled).
    pub analysis_interval_seconds: u64,
    pub warm_start_delay: Duration,
    pub fetch_timeout: Duration,
    pub notify_timeout: Duration,
    pub market_data_url: String,
    pub database_url: Option<String>,
    pub telegram: TelegramConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            environment: get_environment(),
            port: env_parse("PORT", DEFAULT_PORT),
            analysis_interval_seconds: env_parse(
                "ANALYSIS_INTERVAL_SECONDS",
                DEFAULT_ANALYSIS_INTERVAL_SECONDS,
            ),
            warm_start_delay: Duration::from_secs(env_parse(
                "WARM_START_DELAY_SECONDS",
                DEFAULT_WARM_START_DELAY_SECONDS,
            )),
            fetch_timeout: Duration::from_secs(env_parse(
                "FETCH_TIMEOUT_SECONDS",
                DEFAULT_FETCH_TIMEOUT_SECONDS,
            )),
            notify_timeout: Duration::from_secs(env_parse(
                "NOTIFY_TIMEOUT_SECONDS",
                DEFAULT_NOTIFY_TIMEOUT_SECONDS,
            )),
            market_data_url: env_str("MARKET_DATA_URL", DEFAULT_MARKET_DATA_URL),
            database_url: env_opt("DATABASE_URL"),
            telegram: TelegramConfig::from_env(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            port: DEFAULT_PORT,
            analysis_interval_seconds: DEFAULT_ANALYSIS_INTERVAL_SECONDS,
            warm_start_delay: Duration::from_secs(DEFAULT_WARM_START_DELAY_SECONDS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECONDS),
            notify_timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECONDS),
            market_data_url: DEFAULT_MARKET_DATA_URL.to_string(),
            database_url: None,
            telegram: TelegramConfig {
                api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
                bot_token: None,
                chat_id: None,
            },
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_str(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_opt(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
