//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod instrument;
pub mod signal;

pub use indicators::{closes, Candle, IndicatorSnapshot};
pub use instrument::{
    default_instruments, find_default_instrument, Instrument, InstrumentCategory,
    DEFAULT_INSTRUMENTS,
};
pub use signal::{
    AnalysisResult, Direction, EmittedSignalState, SignalTier, SignalVote, StoredSignal,
    VoteBreakdown,
};
