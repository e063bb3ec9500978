//! Prometheus metrics for the analysis loop and the HTTP surface.

use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub analysis_cycles_total: IntCounter,
    pub analysis_cycles_skipped_total: IntCounter,
    pub analysis_cycle_duration_seconds: Histogram,
    pub instrument_failures_total: IntCounter,
    pub signals_emitted_total: IntCounter,
    pub notifications_failed_total: IntCounter,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let analysis_cycles_total = IntCounter::new(
            "analysis_cycles_total",
            "Completed analysis cycles",
        )?;
        let analysis_cycles_skipped_total = IntCounter::new(
            "analysis_cycles_skipped_total",
            "Timer firings skipped because a cycle was still running",
        )?;
        let analysis_cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "analysis_cycle_duration_seconds",
                "Wall time of one analysis cycle",
            )
            .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;
        let instrument_failures_total = IntCounter::new(
            "instrument_failures_total",
            "Instruments skipped in a cycle due to data or provider failures",
        )?;
        let signals_emitted_total = IntCounter::new(
            "signals_emitted_total",
            "New directional signals emitted",
        )?;
        let notifications_failed_total = IntCounter::new(
            "notifications_failed_total",
            "Notification dispatches that failed or timed out",
        )?;
        let http_requests_total = IntCounter::new("http_requests_total", "HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency",
        ))?;
        let http_requests_in_flight =
            Gauge::new("http_requests_in_flight", "HTTP requests currently being served")?;

        registry.register(Box::new(analysis_cycles_total.clone()))?;
        registry.register(Box::new(analysis_cycles_skipped_total.clone()))?;
        registry.register(Box::new(analysis_cycle_duration_seconds.clone()))?;
        registry.register(Box::new(instrument_failures_total.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(notifications_failed_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;

        Ok(Self {
            registry,
            analysis_cycles_total,
            analysis_cycles_skipped_total,
            analysis_cycle_duration_seconds,
            instrument_failures_total,
            signals_emitted_total,
            notifications_failed_total,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
        })
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
