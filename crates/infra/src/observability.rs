//! Tracing setup
//!
//! One-call initialization of the subscriber stack used across the
//! workspace: env-filter + compact fmt. Safe to call more than once; only
//! the first call installs the global subscriber.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// The filter honors `RUST_LOG`; when unset, `default_directive` applies
/// (e.g. `"info"` or `"capexflow_infra=debug"`).
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
