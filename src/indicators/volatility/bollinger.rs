//! Bollinger Bands indicator

use serde::{Deserialize, Serialize};

use crate::indicators::error::{ensure_period, IndicatorError};
use crate::indicators::Series;

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_STD_DEV: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * population standard deviation)
/// Lower Band = Middle - (std_dev * population standard deviation)
pub fn calculate_bollinger_bands(
    prices: &[f64],
    period: usize,
    std_dev: f64,
) -> Result<BollingerBands, IndicatorError> {
    ensure_period("period", period)?;
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(IndicatorError::InvalidParameter {
            name: "std_dev",
            reason: format!("multiplier must be a non-negative number, got {}", std_dev),
        });
    }

    let mut bands = BollingerBands {
        upper: vec![None; prices.len()],
        middle: vec![None; prices.len()],
        lower: vec![None; prices.len()],
    };

    for (offset, window) in prices.windows(period).enumerate() {
        let i = offset + period - 1;
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
        let width = std_dev * variance.sqrt();

        bands.middle[i] = Some(mean);
        bands.upper[i] = Some(mean + width);
        bands.lower[i] = Some(mean - width);
    }

    Ok(bands)
}

/// Calculate Bollinger Bands with default parameters (20 SMA, 2σ)
pub fn calculate_bollinger_bands_default(prices: &[f64]) -> Result<BollingerBands, IndicatorError> {
    calculate_bollinger_bands(prices, DEFAULT_BOLLINGER_PERIOD, DEFAULT_BOLLINGER_STD_DEV)
}
