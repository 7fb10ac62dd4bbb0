#![forbid(unsafe_code)]

//! Builder configuration loaded from TOML or JSON.
//!
//! ```toml
//! # formloom.toml
//! id_prefix = "field"
//! add_cooldown_ms = 250
//!
//! [placement]
//! horizontal = 0.2
//! vertical = 0.3
//!
//! [history]
//! max_depth = 50
//!
//! [logging]
//! filter = "formloom=debug"
//! format = "json"
//! ```
//!
//! Every field has a default, so an empty document yields
//! [`BuilderConfig::default`].

use std::path::Path;
use std::time::Duration;

use formloom_core::PlacementThresholds;
use formloom_core::logging::LogConfig;
use formloom_layout::DEFAULT_ID_PREFIX;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::undo::DEFAULT_MAX_DEPTH;

/// Errors raised while loading a [`BuilderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config rejected: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// History settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Undo steps retained before the oldest is evicted.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Top-level settings for a [`FormBuilder`](crate::FormBuilder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Drop-zone fractions used while hovering.
    pub placement: PlacementThresholds,
    pub history: HistoryConfig,
    /// Window in which a repeated identical add is coalesced.
    pub add_cooldown_ms: u64,
    /// Prefix for generated component ids.
    pub id_prefix: String,
    pub logging: LogConfig,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            placement: PlacementThresholds::default(),
            history: HistoryConfig::default(),
            add_cooldown_ms: 300,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            logging: LogConfig::default(),
        }
    }
}

impl BuilderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load a file, picking the format from its extension (`.json`, else TOML),
    /// and validate the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        config.validated()
    }

    /// Return `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Check every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.placement.validate();
        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be > 0".to_string());
        }
        if self.id_prefix.is_empty() {
            errors.push("id_prefix must not be empty".to_string());
        } else if !self
            .id_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.push(format!(
                "id_prefix must be ASCII letters, digits or '_', got {:?}",
                self.id_prefix
            ));
        }
        errors
    }

    /// The add cooldown as a [`Duration`].
    #[must_use]
    pub fn add_cooldown(&self) -> Duration {
        Duration::from_millis(self.add_cooldown_ms)
    }
}
