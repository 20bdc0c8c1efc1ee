//! Configuration management for the similarity index
//!
//! Runtime configuration is loaded from a JSON file so framing and query
//! parameters can be adjusted without recompilation. Missing sections fall
//! back to their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::FramingParams;
use crate::error::IndexError;
use crate::index::RebuildPolicy;

/// Config file read by [`AppConfig::load`]
pub const DEFAULT_CONFIG_PATH: &str = "assets/index_config.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Frame/hop sizes used for every descriptor in the index
    pub framing: FramingParams,
    pub index: IndexConfig,
}

/// Query and rebuild behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of neighbors returned when the caller does not ask for a count
    pub default_k: usize,
    pub rebuild_policy: RebuildPolicy,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_k: 3,
            rebuild_policy: RebuildPolicy::Eager,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), IndexError> {
        self.framing.validate()
    }

    /// Load configuration from JSON file
    ///
    /// Falls back to the default configuration (with a warning) when the file
    /// is missing, is not valid JSON, or carries unusable framing.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                return Self::default();
            }
        };

        let config: AppConfig = match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(
                    "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                return Self::default();
            }
        };

        if let Err(err) = config.validate() {
            log::warn!(
                "[Config] Rejected configuration from {:?}: {}. Using defaults.",
                path.as_ref(),
                err
            );
            return Self::default();
        }

        log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
        config
    }

    /// Load configuration from [`DEFAULT_CONFIG_PATH`]
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }
}
