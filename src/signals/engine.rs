//! Main signal evaluation engine: indicators, trend filter and confluence.

use chrono::Utc;
use thiserror::Error;

use crate::indicators::{
    calculate_bollinger_bands_default, calculate_ema, calculate_macd_default,
    calculate_rsi_default, last_value, IndicatorError,
};
use crate::models::indicators::{closes, Candle, IndicatorSnapshot};
use crate::models::signal::{AnalysisResult, SignalVote};
use crate::signals::confluence::{cast_votes, classify};
use crate::signals::trend_filter::long_term_trend;

/// Minimum short-interval candles required before an instrument is analyzed.
pub const MIN_CANDLES: usize = 50;

pub const FAST_EMA_PERIOD: usize = 9;
pub const SLOW_EMA_PERIOD: usize = 21;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("not enough candles: {available} < {required}")]
    InsufficientData { required: usize, available: usize },
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

pub struct SignalEngine;

impl SignalEngine {
    /// Full pipeline for one instrument: trend bias from `long_term`, votes and
    /// classification from `short_term`.
    pub fn evaluate(
        symbol: &str,
        short_term: &[Candle],
        long_term: &[Candle],
    ) -> Result<AnalysisResult, AnalysisError> {
        if short_term.len() < MIN_CANDLES {
            return Err(AnalysisError::InsufficientData {
                required: MIN_CANDLES,
                available: short_term.len(),
            });
        }

        let trend = long_term_trend(long_term)?;
        Self::analyze(symbol, short_term, trend)
    }

    /// Score the latest candle of `candles` against a known trend bias.
    pub fn analyze(
        symbol: &str,
        candles: &[Candle],
        trend: SignalVote,
    ) -> Result<AnalysisResult, AnalysisError> {
        let close_price = match candles.last() {
            Some(candle) => candle.close,
            None => {
                return Err(AnalysisError::InsufficientData {
                    required: 1,
                    available: 0,
                })
            }
        };

        let snapshot = Self::snapshot(&closes(candles))?;
        let votes = cast_votes(&snapshot, close_price, trend);
        let classification = classify(&votes);

        Ok(AnalysisResult {
            symbol: symbol.to_string(),
            direction: classification.direction,
            strength: classification.strength,
            tier: classification.tier,
            votes,
            indicators: snapshot,
            close_price,
            timestamp: Utc::now(),
        })
    }

    /// Last-index value of every indicator over `prices`.
    pub fn snapshot(prices: &[f64]) -> Result<IndicatorSnapshot, IndicatorError> {
        let bands = calculate_bollinger_bands_default(prices)?;
        let macd = calculate_macd_default(prices)?;

        Ok(IndicatorSnapshot {
            ema9: last_value(&calculate_ema(prices, FAST_EMA_PERIOD)?),
            ema21: last_value(&calculate_ema(prices, SLOW_EMA_PERIOD)?),
            rsi: last_value(&calculate_rsi_default(prices)?),
            bb_upper: last_value(&bands.upper),
            bb_middle: last_value(&bands.middle),
            bb_lower: last_value(&bands.lower),
            macd_histogram: last_value(&macd.histogram),
        })
    }
}
