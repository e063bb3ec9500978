//! Analysis cycle orchestration.
//!
//! One cycle walks every active instrument: fetch short and long candles,
//! evaluate, and for each directional result that differs from the last one
//! emitted for that instrument, persist it and notify exactly once. Only one
//! cycle runs at a time; a cycle requested while another is running is
//! skipped, not queued.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, DEFAULT_FETCH_TIMEOUT_SECONDS, DEFAULT_NOTIFY_TIMEOUT_SECONDS};
use crate::core::state::SignalStateStore;
use crate::db::{SignalRepository, StoreError};
use crate::metrics::Metrics;
use crate::models::instrument::{default_instruments, find_default_instrument, Instrument};
use crate::models::signal::{AnalysisResult, EmittedSignalState};
use crate::services::market_data::MarketDataProvider;
use crate::services::notifier::NotificationTransport;
use crate::signals::engine::{AnalysisError, SignalEngine};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound for fetching both candle series of one instrument.
    pub fetch_timeout: Duration,
    /// Upper bound for one notification dispatch.
    pub notify_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECONDS),
            notify_timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECONDS),
        }
    }
}

impl From<&AppConfig> for OrchestratorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout,
            notify_timeout: config.notify_timeout,
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("no market data for {0}")]
    NoData(String),
    #[error("market data fetch for {0} timed out")]
    FetchTimeout(String),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub analyzed: usize,
    pub failed: usize,
    /// New directional signals emitted this cycle.
    pub emitted: Vec<AnalysisResult>,
}

impl CycleReport {
    pub fn emitted_symbols(&self) -> Vec<String> {
        self.emitted.iter().map(|r| r.symbol.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Another cycle was still running.
    Skipped,
    Completed(CycleReport),
}

impl CycleOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, CycleOutcome::Skipped)
    }

    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Skipped => None,
            CycleOutcome::Completed(report) => Some(report),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Whether the periodic timer is active.
    pub is_running: bool,
    pub instrument_count: usize,
    pub cycle_in_progress: bool,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

pub struct SignalOrchestrator {
    provider: Arc<dyn MarketDataProvider>,
    repository: Arc<dyn SignalRepository>,
    notifier: Arc<dyn NotificationTransport>,
    state: SignalStateStore,
    metrics: Arc<Metrics>,
    config: OrchestratorConfig,
    cycle_gate: Mutex<()>,
    cycle_in_progress: AtomicBool,
    scheduler_running: AtomicBool,
    instrument_count: AtomicUsize,
    last_cycle_at: RwLock<Option<DateTime<Utc>>>,
}

impl SignalOrchestrator {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        repository: Arc<dyn SignalRepository>,
        notifier: Arc<dyn NotificationTransport>,
        metrics: Arc<Metrics>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            repository,
            notifier,
            state: SignalStateStore::new(),
            metrics,
            config,
            cycle_gate: Mutex::new(()),
            cycle_in_progress: AtomicBool::new(false),
            scheduler_running: AtomicBool::new(false),
            instrument_count: AtomicUsize::new(default_instruments().len()),
            last_cycle_at: RwLock::new(None),
        }
    }

    pub fn repository(&self) -> &Arc<dyn SignalRepository> {
        &self.repository
    }

    pub(crate) fn set_scheduler_running(&self, running: bool) {
        self.scheduler_running.store(running, Ordering::SeqCst);
    }

    /// Run one analysis cycle unless one is already in progress.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let _guard = match self.cycle_gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Analysis cycle still running; skipping this firing");
                self.metrics.analysis_cycles_skipped_total.inc();
                return CycleOutcome::Skipped;
            }
        };
        self.cycle_in_progress.store(true, Ordering::SeqCst);
        let timer = self.metrics.analysis_cycle_duration_seconds.start_timer();

        let instruments = self.load_instruments().await;
        self.instrument_count
            .store(instruments.len(), Ordering::SeqCst);
        info!(
            instrument_count = instruments.len(),
            "Starting analysis cycle for {} instruments",
            instruments.len()
        );

        let mut report = CycleReport::default();
        for instrument in &instruments {
            match self.process_instrument(instrument).await {
                Ok(emitted) => {
                    report.analyzed += 1;
                    if let Some(result) = emitted {
                        report.emitted.push(result);
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    self.metrics.instrument_failures_total.inc();
                    warn!(
                        symbol = %instrument.symbol,
                        error = %e,
                        "Skipping {} this cycle",
                        instrument.symbol
                    );
                }
            }
        }

        timer.observe_duration();
        self.metrics.analysis_cycles_total.inc();
        *self.last_cycle_at.write().await = Some(Utc::now());
        self.cycle_in_progress.store(false, Ordering::SeqCst);

        info!(
            analyzed = report.analyzed,
            failed = report.failed,
            emitted = report.emitted.len(),
            "Analysis cycle finished: {} new signals",
            report.emitted.len()
        );
        CycleOutcome::Completed(report)
    }

    /// Analyze one symbol immediately, bypassing deduplication.
    ///
    /// Directional results are persisted when the symbol is a stored or
    /// default instrument; nothing is notified. Unknown symbols are never
    /// added to the instrument universe.
    pub async fn analyze_now(&self, symbol: &str) -> Result<AnalysisResult, OrchestratorError> {
        let result = self.analyze_symbol(symbol).await?;
        if !result.is_directional() {
            return Ok(result);
        }

        match self.instrument_for_symbol(symbol).await? {
            Some(instrument) => {
                let instrument_id = self.instrument_id(&instrument).await?;
                self.repository.save_signal(instrument_id, &result).await?;
            }
            None => {
                debug!(symbol = %symbol, "{} is not a tracked instrument; result not persisted", symbol);
            }
        }
        Ok(result)
    }

    pub async fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            is_running: self.scheduler_running.load(Ordering::SeqCst),
            instrument_count: self.instrument_count.load(Ordering::SeqCst),
            cycle_in_progress: self.cycle_in_progress.load(Ordering::SeqCst),
            last_cycle_at: *self.last_cycle_at.read().await,
        }
    }

    pub async fn last_signals(&self) -> Vec<EmittedSignalState> {
        self.state.snapshot().await
    }

    async fn load_instruments(&self) -> Vec<Instrument> {
        match self.repository.get_active_instruments().await {
            Ok(instruments) => instruments,
            Err(e) => {
                warn!(error = %e, "Failed to load active instruments; using default universe");
                default_instruments()
            }
        }
    }

    async fn analyze_symbol(&self, symbol: &str) -> Result<AnalysisResult, OrchestratorError> {
        let fetch = async {
            tokio::join!(
                self.provider.fetch_short_term(symbol),
                self.provider.fetch_long_term(symbol)
            )
        };
        let (short_term, long_term) = timeout(self.config.fetch_timeout, fetch)
            .await
            .map_err(|_| OrchestratorError::FetchTimeout(symbol.to_string()))?;

        if short_term.is_empty() {
            return Err(OrchestratorError::NoData(symbol.to_string()));
        }
        debug!(
            symbol = %symbol,
            short = short_term.len(),
            long = long_term.len(),
            "Fetched candles for {}",
            symbol
        );

        Ok(SignalEngine::evaluate(symbol, &short_term, &long_term)?)
    }

    async fn process_instrument(
        &self,
        instrument: &Instrument,
    ) -> Result<Option<AnalysisResult>, OrchestratorError> {
        let symbol = instrument.symbol.as_str();
        let result = self.analyze_symbol(symbol).await?;

        if !result.is_directional() {
            debug!(symbol = %symbol, "No confluence for {}", symbol);
            return Ok(None);
        }
        if !self.state.record_if_changed(&result).await {
            debug!(
                symbol = %symbol,
                direction = %result.direction,
                strength = result.strength,
                "Signal for {} unchanged",
                symbol
            );
            return Ok(None);
        }

        info!(
            symbol = %symbol,
            direction = %result.direction,
            strength = result.strength,
            "New {} signal for {} (strength {})",
            result.direction,
            symbol,
            result.strength
        );
        self.metrics.signals_emitted_total.inc();

        match self.instrument_id(instrument).await {
            Ok(instrument_id) => {
                if let Err(e) = self.repository.save_signal(instrument_id, &result).await {
                    error!(symbol = %symbol, error = %e, "Failed to persist signal for {}", symbol);
                }
            }
            Err(e) => {
                error!(symbol = %symbol, error = %e, "Failed to resolve instrument {}", symbol);
            }
        }

        self.dispatch_notification(&result).await;
        Ok(Some(result))
    }

    async fn dispatch_notification(&self, result: &AnalysisResult) {
        let symbol = result.symbol.as_str();
        let notify = self
            .notifier
            .notify(symbol, result.direction, result.strength, &result.votes);

        match timeout(self.config.notify_timeout, notify).await {
            Ok(true) => {}
            Ok(false) => {
                self.metrics.notifications_failed_total.inc();
                error!(symbol = %symbol, "Notification for {} was not delivered", symbol);
            }
            Err(_) => {
                self.metrics.notifications_failed_total.inc();
                error!(
                    symbol = %symbol,
                    timeout_ms = self.config.notify_timeout.as_millis() as u64,
                    "Notification for {} timed out",
                    symbol
                );
            }
        }
    }

    async fn instrument_id(&self, instrument: &Instrument) -> Result<i64, StoreError> {
        if let Some(id) = instrument.id {
            return Ok(id);
        }
        let stored = self.repository.get_or_create_instrument(instrument).await?;
        stored
            .id
            .ok_or_else(|| StoreError::InvalidRow(format!("instrument {} has no id", instrument.symbol)))
    }

    /// Stored instrument for `symbol`, else its default-universe entry.
    async fn instrument_for_symbol(&self, symbol: &str) -> Result<Option<Instrument>, StoreError> {
        let known = self
            .repository
            .get_all_instruments()
            .await?
            .into_iter()
            .find(|i| i.symbol == symbol);

        Ok(known.or_else(|| find_default_instrument(symbol)))
    }
}
