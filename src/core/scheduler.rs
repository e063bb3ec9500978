//! Cron-based scheduler that drives periodic analysis cycles

use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::core::orchestrator::SignalOrchestrator;

/// Scheduler that fires one analysis cycle per cron tick, plus a warm start
pub struct SignalScheduler {
    orchestrator: Arc<SignalOrchestrator>,
    schedule: Schedule,
    cron_expr: String,
    warm_start_delay: Option<Duration>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler disabled: interval_seconds is 0")]
    Disabled,
    #[error("interval of {0}s does not divide evenly into a minute, hour or day")]
    UnsupportedInterval(u64),
    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },
}

/// Cron expression firing exactly every `interval_seconds`, if one exists.
///
/// Cron steps restart at each minute, hour or day boundary, so only
/// intervals that divide the enclosing unit evenly keep a fixed gap.
/// Cron format: second minute hour day month weekday
pub fn interval_to_cron(interval_seconds: u64) -> Option<String> {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    match interval_seconds {
        0 => None,
        s if s < MINUTE => (MINUTE % s == 0).then(|| format!("*/{} * * * * *", s)),
        s if s < HOUR => {
            (s % MINUTE == 0 && HOUR % s == 0).then(|| format!("0 */{} * * * *", s / MINUTE))
        }
        s if s < DAY => (s % HOUR == 0 && DAY % s == 0).then(|| format!("0 0 */{} * * *", s / HOUR)),
        DAY => Some("0 0 0 * * *".to_string()),
        _ => None,
    }
}

impl SignalScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `orchestrator` - Cycle runner shared with the HTTP surface
    /// * `interval_seconds` - Cycle interval in seconds (0 = disabled)
    /// * `warm_start_delay` - Delay before the first out-of-schedule cycle, if any
    pub fn new(
        orchestrator: Arc<SignalOrchestrator>,
        interval_seconds: u64,
        warm_start_delay: Option<Duration>,
    ) -> Result<Self, SchedulerError> {
        if interval_seconds == 0 {
            return Err(SchedulerError::Disabled);
        }

        let cron_expr = interval_to_cron(interval_seconds)
            .ok_or(SchedulerError::UnsupportedInterval(interval_seconds))?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| SchedulerError::InvalidCron {
            expr: cron_expr.clone(),
            reason: e.to_string(),
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "SignalScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            orchestrator,
            schedule,
            cron_expr,
            warm_start_delay,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn cron_expression(&self) -> &str {
        &self.cron_expr
    }

    /// Start the timer. Calling `start` on a running scheduler is a no-op.
    pub async fn start(&self) {
        let mut handle_slot = self.handle.write().await;
        if handle_slot.is_some() {
            return;
        }

        let orchestrator = self.orchestrator.clone();
        let schedule = self.schedule.clone();
        let warm_start_delay = self.warm_start_delay;

        let handle = tokio::spawn(async move {
            if let Some(delay) = warm_start_delay {
                tokio::time::sleep(delay).await;
                info!("SignalScheduler: warm start");
                fire(&orchestrator);
            }

            loop {
                // Get the next scheduled time
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    continue;
                }

                fire(&orchestrator);
            }
        });

        *handle_slot = Some(handle);
        self.orchestrator.set_scheduler_running(true);
        info!("SignalScheduler: started");
    }

    /// Stop future firings. A cycle already running is left to finish.
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            self.orchestrator.set_scheduler_running(false);
            info!("SignalScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}

/// Run one cycle on its own task so the timer keeps ticking. A tick that
/// lands while the previous cycle is still running is skipped by the
/// orchestrator gate.
fn fire(orchestrator: &Arc<SignalOrchestrator>) {
    let orchestrator = orchestrator.clone();
    tokio::spawn(async move {
        orchestrator.run_cycle().await;
    });
}
