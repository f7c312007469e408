// src/config.rs

//! Workspace configuration
//!
//! An optional `sipmeta.toml` in the workspace (or a file given with
//! `--config`) tunes how sections are hashed and which reference indices
//! are read together:
//!
//! ```toml
//! digest_algorithm = "sha256"
//! reference_files = ["import-object-md-references.json", "create-mix-md-references.json"]
//! sync = true
//! ```

use crate::hash::HashAlgorithm;
use crate::references::AMD_REFERENCE_FILES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration file looked up in the workspace when none is given
pub const DEFAULT_CONFIG_FILE: &str = "sipmeta.toml";

/// Errors loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid reference file name: {0}")]
    InvalidReferenceFile(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Hash used for section digests and metadata IDs
    #[serde(default)]
    pub digest_algorithm: HashAlgorithm,

    /// Index files unioned when reading references back
    #[serde(default = "default_reference_files")]
    pub reference_files: Vec<String>,

    /// fsync files before they are moved into place
    #[serde(default = "default_sync")]
    pub sync: bool,
}

fn default_reference_files() -> Vec<String> {
    AMD_REFERENCE_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_sync() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            digest_algorithm: HashAlgorithm::default(),
            reference_files: default_reference_files(),
            sync: default_sync(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> ConfigResult<()> {
        for name in &self.reference_files {
            if crate::filesystem::path::sanitize_filename(name).is_err() {
                return Err(ConfigError::InvalidReferenceFile(name.clone()));
            }
        }
        Ok(())
    }
}

/// Parse a configuration file
pub fn parse_config_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config_string(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config_string(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load `path`, or `workspace/sipmeta.toml` when no path is given.
///
/// An explicit path must exist; a missing default file means defaults.
pub fn load_config(path: Option<&Path>, workspace: &Path) -> ConfigResult<Config> {
    if let Some(path) = path {
        return parse_config_file(path);
    }

    let default_path = workspace.join(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        debug!("Loading configuration from {}", default_path.display());
        parse_config_file(&default_path)
    } else {
        Ok(Config::default())
    }
}
