#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Library code emits `tracing` events directly. Hosts that want output
//! enable the `subscriber` feature and call [`init`] once at startup; the
//! filter follows `RUST_LOG` syntax and falls back to [`LogConfig::filter`].

use serde::{Deserialize, Serialize};

pub use tracing::{debug, debug_span, error, info, info_span, trace, warn};

/// Output encoding for the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default directive when `RUST_LOG` is unset (e.g. `"formloom=debug"`).
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Error returned when a global subscriber is already installed or the
/// filter directive does not parse.
#[cfg(feature = "subscriber")]
#[derive(Debug)]
pub struct LoggingInitError(String);

#[cfg(feature = "subscriber")]
impl std::fmt::Display for LoggingInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to install tracing subscriber: {}", self.0)
    }
}

#[cfg(feature = "subscriber")]
impl std::error::Error for LoggingInitError {}

/// Install a global subscriber configured by `config`.
#[cfg(feature = "subscriber")]
pub fn init(config: &LogConfig) -> Result<(), LoggingInitError> {
    use tracing_subscriber::EnvFilter;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|err| LoggingInitError(err.to_string()))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| LoggingInitError(err.to_string()))
}
