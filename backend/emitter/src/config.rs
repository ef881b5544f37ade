//! Emitter configuration.
//!
//! Every field has a default, so an empty mapping is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Emit on [`crate::EVENT_INCLUDED`] / [`crate::EVENT_EXCLUDED`] when an
    /// event key gains its first listener or loses its last one.
    pub lifecycle_events: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            lifecycle_events: true,
        }
    }
}

impl EmitterConfig {
    /// Parse a config from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Config for the plain registry: no lifecycle notifications.
    pub fn plain() -> Self {
        Self {
            lifecycle_events: false,
        }
    }
}
