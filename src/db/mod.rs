//! Persistence for instruments and emitted signals.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::models::instrument::{default_instruments, Instrument};
use crate::models::signal::{AnalysisResult, StoredSignal};

/// Candle interval recorded on every persisted signal.
pub const SIGNAL_INTERVAL: &str = "5m";

pub const DEFAULT_RECENT_LIMIT: usize = 50;
pub const DEFAULT_SYMBOL_LIMIT: usize = 20;
pub const DEFAULT_STRONG_MIN_STRENGTH: u8 = 3;
pub const DEFAULT_STRONG_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
    #[error("failed to encode indicators: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("instrument {0} not found")]
    InstrumentNotFound(i64),
    #[error("instrument {0} already exists")]
    DuplicateInstrument(String),
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

#[async_trait]
pub trait SignalRepository: Send + Sync {
    async fn get_all_instruments(&self) -> Result<Vec<Instrument>, StoreError>;

    async fn get_active_instruments(&self) -> Result<Vec<Instrument>, StoreError>;

    /// Return the stored instrument with this symbol, inserting it first if
    /// it does not exist yet. An existing row is returned unchanged.
    async fn get_or_create_instrument(
        &self,
        instrument: &Instrument,
    ) -> Result<Instrument, StoreError>;

    async fn create_instrument(&self, instrument: &Instrument) -> Result<Instrument, StoreError>;

    async fn set_instrument_active(&self, id: i64, active: bool)
        -> Result<Instrument, StoreError>;

    async fn save_signal(
        &self,
        instrument_id: i64,
        result: &AnalysisResult,
    ) -> Result<StoredSignal, StoreError>;

    /// Newest first.
    async fn recent_signals(&self, limit: usize) -> Result<Vec<StoredSignal>, StoreError>;

    async fn signals_by_symbol(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<StoredSignal>, StoreError>;

    async fn strong_signals(
        &self,
        min_strength: u8,
        limit: usize,
    ) -> Result<Vec<StoredSignal>, StoreError>;
}

/// Make sure every default instrument exists. Returns how many are stored.
pub async fn seed_default_instruments(repo: &dyn SignalRepository) -> Result<usize, StoreError> {
    let mut seeded = 0;
    for instrument in default_instruments() {
        repo.get_or_create_instrument(&instrument).await?;
        seeded += 1;
    }
    info!(count = seeded, "Default instruments seeded");
    Ok(seeded)
}
