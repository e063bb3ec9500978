//! Market data provider interface.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::indicators::Candle;

/// Bar width requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
}

impl CandleInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandleInterval::OneMinute => "1m",
            CandleInterval::FiveMinutes => "5m",
            CandleInterval::FifteenMinutes => "15m",
            CandleInterval::ThirtyMinutes => "30m",
            CandleInterval::OneHour => "1h",
            CandleInterval::OneDay => "1d",
            CandleInterval::OneWeek => "1wk",
            CandleInterval::OneMonth => "1mo",
        }
    }
}

/// How far back the provider should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackPeriod {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl LookbackPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackPeriod::OneDay => "1d",
            LookbackPeriod::FiveDays => "5d",
            LookbackPeriod::OneMonth => "1mo",
            LookbackPeriod::ThreeMonths => "3mo",
            LookbackPeriod::SixMonths => "6mo",
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::TwoYears => "2y",
            LookbackPeriod::FiveYears => "5y",
            LookbackPeriod::TenYears => "10y",
            LookbackPeriod::YearToDate => "ytd",
            LookbackPeriod::Max => "max",
        }
    }

    /// First instant covered by this period when looking back from `now`.
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let months_back = |months: u32| {
            now.checked_sub_months(Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        };

        match self {
            LookbackPeriod::OneDay => now - Duration::days(1),
            LookbackPeriod::FiveDays => now - Duration::days(5),
            LookbackPeriod::OneMonth => months_back(1),
            LookbackPeriod::ThreeMonths => months_back(3),
            LookbackPeriod::SixMonths => months_back(6),
            LookbackPeriod::OneYear => months_back(12),
            LookbackPeriod::TwoYears => months_back(24),
            LookbackPeriod::FiveYears => months_back(60),
            LookbackPeriod::TenYears => months_back(120),
            LookbackPeriod::YearToDate => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
            LookbackPeriod::Max => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// 5-minute bars over five days, enough for every short-horizon indicator.
pub const SHORT_TERM_WINDOW: (CandleInterval, LookbackPeriod) =
    (CandleInterval::FiveMinutes, LookbackPeriod::FiveDays);

/// Hourly bars over a month, enough for the EMA-50 trend filter.
pub const LONG_TERM_WINDOW: (CandleInterval, LookbackPeriod) =
    (CandleInterval::OneHour, LookbackPeriod::OneMonth);

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid provider url: {0}")]
    Url(#[from] url::ParseError),
    #[error("provider returned status {status} for {symbol}")]
    Status { symbol: String, status: u16 },
    #[error("empty chart for {0}")]
    EmptyChart(String),
    #[error("malformed payload for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Candles for `symbol`, oldest first.
    ///
    /// Implementations never fail: any error is logged and reported as an
    /// empty vector.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        period: LookbackPeriod,
    ) -> Vec<Candle>;

    async fn fetch_short_term(&self, symbol: &str) -> Vec<Candle> {
        let (interval, period) = SHORT_TERM_WINDOW;
        self.fetch_candles(symbol, interval, period).await
    }

    async fn fetch_long_term(&self, symbol: &str) -> Vec<Candle> {
        let (interval, period) = LONG_TERM_WINDOW;
        self.fetch_candles(symbol, interval, period).await
    }
}
