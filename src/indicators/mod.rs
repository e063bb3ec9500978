//! Indicator calculators over closing-price sequences.
//!
//! Every calculator returns a series aligned with its input. Entries that are
//! still inside the warm-up window are `None`; they never default to zero.

pub mod error;

pub mod momentum;
pub mod trend;
pub mod volatility;

pub use error::IndicatorError;
pub use momentum::*;
pub use trend::*;
pub use volatility::*;

/// Indicator output aligned index-for-index with the input prices.
pub type Series = Vec<Option<f64>>;

/// Value at the last index of a series, if defined.
pub fn last_value(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}
