//! Signal evaluation: trend filter, confluence voting and the engine tying
//! them to the indicator calculators.

pub mod confluence;
pub mod engine;
pub mod trend_filter;

pub use confluence::*;
pub use engine::*;
pub use trend_filter::*;
