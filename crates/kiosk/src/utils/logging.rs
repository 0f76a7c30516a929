//! Logging configuration using tracing
//!
//! Log level is controlled by `RUST_LOG`; output goes to stderr so the
//! console front end keeps stdout to itself.
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin rvm-kiosk
//! RVM_LOG_FORMAT=json cargo run --bin rvm-kiosk
//! ```

use anyhow::anyhow;
use rvm_domain::LogFormat;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "rvm_kiosk=info,rvm_core=info,rvm_infra=info,warn";

/// Initialize the global subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(format: LogFormat) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).with_current_span(true).try_init(),
    };

    result.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
