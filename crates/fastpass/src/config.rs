//! Configuration for a FastPass instance.
//!
//! Every struct here deserializes with missing fields filled from
//! `Default`, so a host can load a partial config file and override only
//! what it cares about.

use fastpass_bridge::BridgeConfig;
use fastpass_session::SessionConfig;
use serde::{Deserialize, Serialize};

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastPassConfig {
    /// Channel namespace. `None` uses the host plugin's name.
    pub namespace: Option<String>,

    /// Register premium players with the auth plugin on first join when
    /// they have no account there yet.
    pub auto_register: bool,

    /// Store size that triggers the first sweep of dead sessions.
    pub purge_threshold: usize,

    pub bridge: BridgeConfig,

    pub logging: LoggingConfig,
}

impl FastPassConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            purge_threshold: self.purge_threshold,
        }
    }
}

impl Default for FastPassConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            auto_register: false,
            purge_threshold: SessionConfig::default().purge_threshold,
            bridge: BridgeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Settings for [`crate::logging::init`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset. Default: `info`.
    pub level: String,

    /// Emit one JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
