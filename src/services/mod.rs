//! External integrations: market data and notification delivery.

pub mod market_data;
pub mod notifier;
pub mod telegram;
pub mod yahoo;

pub use market_data::*;
pub use notifier::*;
pub use telegram::*;
pub use yahoo::YahooMarketDataProvider;
