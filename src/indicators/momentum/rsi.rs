//! RSI (Relative Strength Index) indicator

use crate::indicators::error::{ensure_period, IndicatorError};
use crate::indicators::Series;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Calculate the RSI series
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// Averages are seeded over the first `period` price changes and then follow
/// Wilder's smoothing. The first defined value sits at index `period`.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Result<Series, IndicatorError> {
    ensure_period("period", period)?;

    let mut rsi = vec![None; prices.len()];
    if prices.len() < period + 1 {
        return Ok(rsi);
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);
    for window in prices.windows(2) {
        let change = window[1] - window[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    rsi[period] = Some(relative_strength_index(avg_gain, avg_loss));

    let smoothing = (period - 1) as f64;
    for i in period..gains.len() {
        avg_gain = (avg_gain * smoothing + gains[i]) / period as f64;
        avg_loss = (avg_loss * smoothing + losses[i]) / period as f64;
        rsi[i + 1] = Some(relative_strength_index(avg_gain, avg_loss));
    }

    Ok(rsi)
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(prices: &[f64]) -> Result<Series, IndicatorError> {
    calculate_rsi(prices, DEFAULT_RSI_PERIOD)
}

fn relative_strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
