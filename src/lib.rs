pub mod auth;
pub mod config;
pub mod error;
pub mod estimator;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod payment;
pub mod preview;
pub mod server;
pub mod signals;
pub mod token;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Initialize tracing/logging
///
/// Note: This function can only be called once. The filter comes from
/// `RUST_LOG` and defaults to `info`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }
}
