//! Yahoo Finance chart API market data provider

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::messages::{ChartResponse, Quote};
use crate::config::DEFAULT_MARKET_DATA_URL;
use crate::models::indicators::Candle;
use crate::services::market_data::{
    CandleInterval, LookbackPeriod, MarketDataError, MarketDataProvider,
};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; confluence/0.1)";

pub struct YahooMarketDataProvider {
    client: Client,
    base_url: String,
}

impl YahooMarketDataProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_MARKET_DATA_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    /// Provider with a per-request timeout applied by the HTTP client.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn chart_url(
        &self,
        symbol: &str,
        interval: CandleInterval,
        period: LookbackPeriod,
        now: DateTime<Utc>,
    ) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &period.start_from(now).timestamp().to_string())
            .append_pair("period2", &now.timestamp().to_string())
            .append_pair("interval", interval.as_str());
        Ok(url)
    }

    /// Fetch and parse one chart, surfacing every failure as an error.
    pub async fn try_fetch_candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        period: LookbackPeriod,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let url = self.chart_url(symbol, interval, period, Utc::now())?;
        debug!(symbol = %symbol, interval = interval.as_str(), period = period.as_str(), "Requesting chart");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ChartResponse = response.json().await?;
        parse_chart(symbol, body)
    }
}

impl Default for YahooMarketDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for YahooMarketDataProvider {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        period: LookbackPeriod,
    ) -> Vec<Candle> {
        match self.try_fetch_candles(symbol, interval, period).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Failed to fetch candles for {}", symbol);
                Vec::new()
            }
        }
    }
}

/// Turn a chart payload into candles, oldest first.
///
/// Bars with a missing or zero open, high, low or close are dropped, as are
/// bars whose timestamp does not advance past the previous kept bar. A missing
/// volume counts as zero.
pub fn parse_chart(symbol: &str, body: ChartResponse) -> Result<Vec<Candle>, MarketDataError> {
    if let Some(error) = body.chart.error {
        return Err(MarketDataError::Malformed {
            symbol: symbol.to_string(),
            reason: error
                .description
                .or(error.code)
                .unwrap_or_else(|| "unknown chart error".to_string()),
        });
    }

    let result = body
        .chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.swap_remove(0))
            }
        })
        .ok_or_else(|| MarketDataError::EmptyChart(symbol.to_string()))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut candles: Vec<Candle> = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(candle) = candle_at(&quote, i, *ts) else {
            continue;
        };
        if let Some(last) = candles.last() {
            if candle.timestamp <= last.timestamp {
                continue;
            }
        }
        candles.push(candle);
    }

    Ok(candles)
}

fn candle_at(quote: &Quote, i: usize, ts: i64) -> Option<Candle> {
    let field = |values: &[Option<f64>]| {
        values
            .get(i)
            .copied()
            .flatten()
            .filter(|v| v.is_finite() && *v != 0.0)
    };

    let open = field(&quote.open)?;
    let high = field(&quote.high)?;
    let low = field(&quote.low)?;
    let close = field(&quote.close)?;
    let volume = quote.volume.get(i).copied().flatten().unwrap_or(0.0);
    let timestamp = DateTime::from_timestamp(ts, 0)?;

    Some(Candle::new(open, high, low, close, volume, timestamp))
}
