//! TOML configuration loader with validation.
//!
//! Parses a [`ControllerConfig`], runs every section's bounds checks and
//! resolves the live-tuning store backend.

use std::path::Path;

use steer_common::config::{ConfigError, ConfigLoader};
use steer_common::lateral::config::ControllerConfig;
use tracing::{debug, warn};

use crate::tuning::{ConfiguredStore, FileParamStore, MemoryParamStore};

/// Load and validate the controller configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let config = ControllerConfig::load(path)?;
    debug!(path = %path.display(), "config file read");
    validate(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<ControllerConfig, ConfigError> {
    validate(ControllerConfig::from_toml(content)?)
}

fn validate(config: ControllerConfig) -> Result<ControllerConfig, ConfigError> {
    config.shared.validate()?;
    config.validate().map_err(ConfigError::ValidationError)?;
    Ok(config)
}

/// Store backend for live tuning.
///
/// A configured directory that does not exist is not fatal: reads report
/// every key as unset, so live tuning simply stays disabled.
pub fn param_store(config: &ControllerConfig) -> ConfiguredStore {
    match &config.params_dir {
        Some(dir) => {
            let path = Path::new(dir);
            if !path.is_dir() {
                warn!(params_dir = %dir, "params directory not found, live tuning inactive");
            }
            ConfiguredStore::File(FileParamStore::new(path))
        }
        None => ConfiguredStore::Memory(MemoryParamStore::new()),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
