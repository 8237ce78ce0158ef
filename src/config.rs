// src/config.rs

//! Configuration loading utilities.
//!
//! Combines the TOML file, environment overrides and validation into the
//! single call every entry point makes.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Environment variable naming a config file for the Lambda runtime.
pub const CONFIG_PATH_ENV: &str = "INSTAFOLIO_CONFIG";

/// Load configuration from a TOML file, apply environment overrides, validate.
///
/// A missing or unreadable file falls back to defaults; invalid values do not.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Load configuration for environments without a config directory.
///
/// Reads the file named by [`CONFIG_PATH_ENV`] when set, defaults otherwise.
pub fn load_config_from_env() -> Result<Config> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => load_config(Path::new(&path)),
        _ => {
            let mut config = Config::default();
            config.apply_env();
            config.validate()?;
            Ok(config)
        }
    }
}
