//! In-process store used when no database is configured, and in tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SignalRepository, StoreError, SIGNAL_INTERVAL};
use crate::models::instrument::Instrument;
use crate::models::signal::{AnalysisResult, StoredSignal};

#[derive(Default)]
struct MemoryInner {
    instruments: Vec<Instrument>,
    signals: Vec<StoredSignal>,
    next_instrument_id: i64,
    next_signal_id: i64,
}

impl MemoryInner {
    fn insert_instrument(&mut self, instrument: &Instrument) -> Instrument {
        self.next_instrument_id += 1;
        let mut stored = instrument.clone();
        stored.id = Some(self.next_instrument_id);
        self.instruments.push(stored.clone());
        stored
    }

    fn newest_signals(
        &self,
        filter: impl Fn(&StoredSignal) -> bool,
        limit: usize,
    ) -> Vec<StoredSignal> {
        self.signals
            .iter()
            .rev()
            .filter(|s| filter(s))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalRepository for MemoryStore {
    async fn get_all_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        Ok(self.inner.read().await.instruments.clone())
    }

    async fn get_active_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.instruments.iter().filter(|i| i.active).cloned().collect())
    }

    async fn get_or_create_instrument(
        &self,
        instrument: &Instrument,
    ) -> Result<Instrument, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner
            .instruments
            .iter()
            .find(|i| i.symbol == instrument.symbol)
        {
            return Ok(existing.clone());
        }
        Ok(inner.insert_instrument(instrument))
    }

    async fn create_instrument(&self, instrument: &Instrument) -> Result<Instrument, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.instruments.iter().any(|i| i.symbol == instrument.symbol) {
            return Err(StoreError::DuplicateInstrument(instrument.symbol.clone()));
        }
        Ok(inner.insert_instrument(instrument))
    }

    async fn set_instrument_active(
        &self,
        id: i64,
        active: bool,
    ) -> Result<Instrument, StoreError> {
        let mut inner = self.inner.write().await;
        let instrument = inner
            .instruments
            .iter_mut()
            .find(|i| i.id == Some(id))
            .ok_or(StoreError::InstrumentNotFound(id))?;
        instrument.active = active;
        Ok(instrument.clone())
    }

    async fn save_signal(
        &self,
        instrument_id: i64,
        result: &AnalysisResult,
    ) -> Result<StoredSignal, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.instruments.iter().any(|i| i.id == Some(instrument_id)) {
            return Err(StoreError::InstrumentNotFound(instrument_id));
        }

        inner.next_signal_id += 1;
        let stored = StoredSignal {
            id: inner.next_signal_id,
            instrument_id,
            symbol: result.symbol.clone(),
            direction: result.direction,
            strength: result.strength,
            interval: SIGNAL_INTERVAL.to_string(),
            votes: result.votes,
            close_price: result.close_price,
            indicators: result.indicators.clone(),
            created_at: result.timestamp,
        };
        inner.signals.push(stored.clone());
        Ok(stored)
    }

    async fn recent_signals(&self, limit: usize) -> Result<Vec<StoredSignal>, StoreError> {
        Ok(self.inner.read().await.newest_signals(|_| true, limit))
    }

    async fn signals_by_symbol(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<StoredSignal>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.newest_signals(|s| s.symbol == symbol, limit))
    }

    async fn strong_signals(
        &self,
        min_strength: u8,
        limit: usize,
    ) -> Result<Vec<StoredSignal>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.newest_signals(|s| s.strength >= min_strength, limit))
    }
}
