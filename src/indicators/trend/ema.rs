//! EMA (Exponential Moving Average) indicator

use crate::indicators::error::{ensure_period, IndicatorError};
use crate::indicators::Series;

/// Smoothing multiplier for an EMA of `period`.
pub fn ema_multiplier(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Next EMA value from the previous one.
pub fn ema_step(price: f64, previous: f64, period: usize) -> f64 {
    (price - previous) * ema_multiplier(period) + previous
}

/// Calculate the EMA series for `period`.
///
/// The value at `period - 1` is seeded with the simple mean of the first
/// `period` prices. Shorter inputs yield an all-`None` series.
pub fn calculate_ema(prices: &[f64], period: usize) -> Result<Series, IndicatorError> {
    ensure_period("period", period)?;

    let mut ema = vec![None; prices.len()];
    if prices.len() < period {
        return Ok(ema);
    }

    let seed = prices[..period].iter().sum::<f64>() / period as f64;
    ema[period - 1] = Some(seed);

    let mut previous = seed;
    for (i, &price) in prices.iter().enumerate().skip(period) {
        previous = ema_step(price, previous, period);
        ema[i] = Some(previous);
    }

    Ok(ema)
}
