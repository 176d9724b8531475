//! Logging service

use crate::models::LogLevel;
use tracing_subscriber::EnvFilter;

/// Filter directive for the flowrelay crates at `level`
pub fn filter_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "flowrelay=error,flowrelay_core=error",
        LogLevel::Warn => "flowrelay=warn,flowrelay_core=warn",
        LogLevel::Info => "flowrelay=info,flowrelay_core=info",
        LogLevel::Debug => "flowrelay=debug,flowrelay_core=debug",
        LogLevel::Trace => "flowrelay=trace,flowrelay_core=trace",
    }
}

/// Initialize logging with the specified level. `RUST_LOG`, when set, wins.
pub fn init_logging(level: LogLevel) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}
