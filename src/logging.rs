//! Structured logging setup
//!
//! `RUST_LOG` overrides the default filter. `QUEUE_LOG_FORMAT=json` switches
//! the console output to JSON lines.

use std::env;
use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str = "queue_display=info,tower_http=info";

/// Initialize the global tracing subscriber once
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let json = env::var("QUEUE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

        let layer = if json {
            fmt::layer().with_target(true).json().with_filter(filter).boxed()
        } else {
            fmt::layer().with_target(true).with_filter(filter).boxed()
        };

        // A subscriber may already be installed by a test harness
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}
