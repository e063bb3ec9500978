//! Last emitted signal per instrument, used for change-based deduplication.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::signal::{AnalysisResult, EmittedSignalState};

#[derive(Default)]
pub struct SignalStateStore {
    states: RwLock<HashMap<String, EmittedSignalState>>,
}

impl SignalStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `result` as the instrument's latest signal if it is directional
    /// and differs from the stored state by direction or strength.
    ///
    /// Returns `true` when the state changed. Check and update happen under one
    /// write lock, so concurrent callers for the same symbol cannot both see a
    /// change.
    pub async fn record_if_changed(&self, result: &AnalysisResult) -> bool {
        if !result.is_directional() {
            return false;
        }

        let mut states = self.states.write().await;
        if let Some(previous) = states.get(&result.symbol) {
            if previous.matches(result) {
                return false;
            }
        }
        states.insert(
            result.symbol.clone(),
            EmittedSignalState::from_result(result),
        );
        true
    }

    /// All stored states, ordered by symbol.
    pub async fn snapshot(&self) -> Vec<EmittedSignalState> {
        let states = self.states.read().await;
        let mut all: Vec<EmittedSignalState> = states.values().cloned().collect();
        all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        all
    }
}
