//! Long-horizon trend bias from the EMA-50 of hourly closes.

use crate::indicators::{calculate_ema, last_value, IndicatorError};
use crate::models::indicators::{closes, Candle};
use crate::models::signal::SignalVote;

pub const TREND_EMA_PERIOD: usize = 50;

/// Trend bias of the latest close against its EMA-50.
///
/// Fewer than 50 candles is not an error: the filter abstains with `Neutral`.
pub fn long_term_trend(candles: &[Candle]) -> Result<SignalVote, IndicatorError> {
    if candles.len() < TREND_EMA_PERIOD {
        return Ok(SignalVote::Neutral);
    }

    let closes = closes(candles);
    let ema = last_value(&calculate_ema(&closes, TREND_EMA_PERIOD)?);
    let last_close = closes.last().copied();

    Ok(match (last_close, ema) {
        (Some(close), Some(ema)) if close > ema => SignalVote::Call,
        (Some(close), Some(ema)) if close < ema => SignalVote::Put,
        _ => SignalVote::Neutral,
    })
}
