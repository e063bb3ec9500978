//! Tracing subscriber setup for the signal engine
//!
//! Production emits one JSON object per event for log shipping; every other
//! environment gets colored single-line output.

use crate::config::{get_environment, is_production};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Name reported in logs and by the health endpoint.
pub const SERVICE_NAME: &str = "confluence-signal-engine";

/// Filter used when `RUST_LOG` is unset. Keeps HTTP client and server
/// internals quiet so cycle and signal events stand out.
pub const DEFAULT_LOG_FILTER: &str = "info,confluence=info,tower_http=warn,hyper=warn,reqwest=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

pub fn init_logging() {
    if is_production() {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().compact().with_target(false).with_ansi(true))
            .init();
    }

    info!(
        service = SERVICE_NAME,
        environment = %get_environment(),
        "Logging initialized for {}",
        SERVICE_NAME
    );
}
