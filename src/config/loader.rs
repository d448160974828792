//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::schema::ServeConfig;
use crate::config::validation::validate_config;

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServeConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
