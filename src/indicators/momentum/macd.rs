//! MACD (Moving Average Convergence Divergence) indicator

use serde::{Deserialize, Serialize};

use crate::indicators::error::{ensure_period, IndicatorError};
use crate::indicators::trend::calculate_ema;
use crate::indicators::Series;

pub const DEFAULT_MACD_PERIODS: (usize, usize, usize) = (12, 26, 9);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd_line: Series,
    pub signal_line: Series,
    pub histogram: Series,
}

/// Calculate MACD
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal_period) of the defined MACD values
/// Histogram = MACD - Signal
///
/// The signal EMA runs over the compacted MACD values (leading `None`s
/// dropped) and is then written back at the original indices.
pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<MacdSeries, IndicatorError> {
    ensure_period("fast_period", fast_period)?;
    ensure_period("slow_period", slow_period)?;
    ensure_period("signal_period", signal_period)?;

    let fast = calculate_ema(prices, fast_period)?;
    let slow = calculate_ema(prices, slow_period)?;

    let macd_line: Series = fast
        .iter()
        .zip(slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let (positions, defined): (Vec<usize>, Vec<f64>) = macd_line
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .unzip();

    let compact_signal = calculate_ema(&defined, signal_period)?;
    let mut signal_line = vec![None; prices.len()];
    for (position, value) in positions.into_iter().zip(compact_signal) {
        signal_line[position] = value;
    }

    let histogram: Series = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    Ok(MacdSeries {
        macd_line,
        signal_line,
        histogram,
    })
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(prices: &[f64]) -> Result<MacdSeries, IndicatorError> {
    let (fast, slow, signal) = DEFAULT_MACD_PERIODS;
    calculate_macd(prices, fast, slow, signal)
}
