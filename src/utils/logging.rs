//! Structured logging setup.
//!
//! Thin wrapper over `tracing-subscriber` driven by
//! [`LoggingConfig`](crate::config::LoggingConfig). Initialization is
//! global and idempotent from the caller's perspective: a second call
//! reports a configuration error rather than panicking.

use crate::config::LoggingConfig;
use crate::error::{Result, WampError};

/// Install the global tracing subscriber according to the configuration.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(true);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| WampError::ConfigError(format!("Failed to install subscriber: {e}")))
}
