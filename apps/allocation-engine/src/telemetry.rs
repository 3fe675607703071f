//! Tracing Setup
//!
//! Installs a console `tracing-subscriber` filtered by `RUST_LOG`
//! (default `info`).
//!
//! # Usage
//!
//! ```rust,ignore
//! use allocation_engine::telemetry::init_tracing;
//!
//! fn main() {
//!     init_tracing().ok();
//!     // ... application code
//! }
//! ```

use tracing_subscriber::EnvFilter;

/// Error raised when a global subscriber is already installed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Install the global console subscriber.
///
/// Set `NO_COLOR` to disable ANSI colours.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing() -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let ansi = std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| TelemetryError(e.to_string()))
}
