//! Mock collaborators for orchestrator-level tests

#![allow(dead_code)]

use async_trait::async_trait;
use confluence::core::orchestrator::{OrchestratorConfig, SignalOrchestrator};
use confluence::db::{MemoryStore, SignalRepository};
use confluence::metrics::Metrics;
use confluence::models::indicators::Candle;
use confluence::models::instrument::{Instrument, InstrumentCategory};
use confluence::models::signal::{Direction, VoteBreakdown};
use confluence::services::market_data::{CandleInterval, LookbackPeriod, MarketDataProvider};
use confluence::services::notifier::NotificationTransport;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

/// Provider serving fixed candle series per symbol.
#[derive(Default)]
pub struct ScriptedProvider {
    series: Mutex<HashMap<String, (Vec<Candle>, Vec<Candle>)>>,
    fetches: AtomicUsize,
    delay: Option<Duration>,
    gate: Option<Arc<Semaphore>>,
    started: Notify,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Every fetch blocks until the returned semaphore receives permits.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let provider = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (provider, gate)
    }

    pub fn set_series(&self, symbol: &str, short_term: Vec<Candle>, long_term: Vec<Candle>) {
        self.series
            .lock()
            .unwrap()
            .insert(symbol.to_string(), (short_term, long_term));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Resolves once the first fetch has started.
    pub async fn wait_until_started(&self) {
        self.started.notified().await;
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        _period: LookbackPeriod,
    ) -> Vec<Candle> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let series = self.series.lock().unwrap();
        match series.get(symbol) {
            Some((short_term, _)) if interval == CandleInterval::FiveMinutes => short_term.clone(),
            Some((_, long_term)) => long_term.clone(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub symbol: String,
    pub direction: Direction,
    pub strength: u8,
}

/// Notifier that records every call.
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    succeed: bool,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            succeed: true,
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::new()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingNotifier {
    async fn notify(
        &self,
        symbol: &str,
        direction: Direction,
        strength: u8,
        _votes: &VoteBreakdown,
    ) -> bool {
        self.sent.lock().unwrap().push(SentNotification {
            symbol: symbol.to_string(),
            direction,
            strength,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.succeed
    }
}

pub struct TestHarness {
    pub orchestrator: Arc<SignalOrchestrator>,
    pub provider: Arc<ScriptedProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub repository: Arc<MemoryStore>,
    pub metrics: Arc<Metrics>,
}

impl TestHarness {
    pub async fn new(
        provider: ScriptedProvider,
        notifier: RecordingNotifier,
        symbols: &[&str],
        config: OrchestratorConfig,
    ) -> Self {
        let provider = Arc::new(provider);
        let notifier = Arc::new(notifier);
        let repository = Arc::new(MemoryStore::new());
        for symbol in symbols {
            repository
                .create_instrument(&Instrument::new(symbol, symbol, InstrumentCategory::Forex))
                .await
                .expect("create instrument");
        }
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));

        let orchestrator = Arc::new(SignalOrchestrator::new(
            provider.clone(),
            repository.clone(),
            notifier.clone(),
            metrics.clone(),
            config,
        ));

        Self {
            orchestrator,
            provider,
            notifier,
            repository,
            metrics,
        }
    }
}

pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        fetch_timeout: Duration::from_millis(500),
        notify_timeout: Duration::from_millis(500),
    }
}
