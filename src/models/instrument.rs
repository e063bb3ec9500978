use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentCategory {
    Forex,
    Crypto,
    Equity,
}

impl InstrumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentCategory::Forex => "forex",
            InstrumentCategory::Crypto => "crypto",
            InstrumentCategory::Equity => "equity",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "forex" => Some(InstrumentCategory::Forex),
            "crypto" => Some(InstrumentCategory::Crypto),
            "equity" | "stock" => Some(InstrumentCategory::Equity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub symbol: String,
    pub display_name: String,
    pub category: InstrumentCategory,
    pub active: bool,
}

impl Instrument {
    pub fn new(symbol: &str, display_name: &str, category: InstrumentCategory) -> Self {
        Self {
            id: None,
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            category,
            active: true,
        }
    }
}

/// Symbols monitored out of the box, in Yahoo Finance notation.
pub const DEFAULT_INSTRUMENTS: &[(&str, &str, InstrumentCategory)] = &[
    ("EURUSD=X", "EUR/USD", InstrumentCategory::Forex),
    ("GBPUSD=X", "GBP/USD", InstrumentCategory::Forex),
    ("USDJPY=X", "USD/JPY", InstrumentCategory::Forex),
    ("AUDUSD=X", "AUD/USD", InstrumentCategory::Forex),
    ("USDCAD=X", "USD/CAD", InstrumentCategory::Forex),
    ("EURJPY=X", "EUR/JPY", InstrumentCategory::Forex),
    ("NZDUSD=X", "NZD/USD", InstrumentCategory::Forex),
    ("USDCHF=X", "USD/CHF", InstrumentCategory::Forex),
    ("AUDJPY=X", "AUD/JPY", InstrumentCategory::Forex),
    ("EURGBP=X", "EUR/GBP", InstrumentCategory::Forex),
    ("GBPJPY=X", "GBP/JPY", InstrumentCategory::Forex),
    ("BTC-USD", "Bitcoin", InstrumentCategory::Crypto),
];

pub fn default_instruments() -> Vec<Instrument> {
    DEFAULT_INSTRUMENTS
        .iter()
        .map(|(symbol, name, category)| Instrument::new(symbol, name, *category))
        .collect()
}

/// Look up a symbol in the default universe.
pub fn find_default_instrument(symbol: &str) -> Option<Instrument> {
    DEFAULT_INSTRUMENTS
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(symbol, name, category)| Instrument::new(symbol, name, *category))
}
