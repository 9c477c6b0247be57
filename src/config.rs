//! Client configuration file
//!
//! `swarmctl` reads `config.json` from its configuration directory
//! (`~/.swarmctl` unless overridden). A missing file is not an error.

use crate::error::{Result, SwarmctlError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Client settings read from `config.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Manager address used when `--host` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Default format for `stack services`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_format: Option<String>,
    /// Default format for `config ls`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_format: Option<String>,
}

impl CliConfig {
    /// `~/.swarmctl`, if a home directory can be determined
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".swarmctl"))
    }

    /// Load `config.json` from `dir`, or from [`CliConfig::default_dir`]
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => match Self::default_dir() {
                Some(dir) => dir,
                None => {
                    debug!("no home directory, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };
        Self::load_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Load a configuration file, treating a missing or blank file as empty
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no client configuration at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config = serde_json::from_str(&content).map_err(|e| {
            SwarmctlError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        debug!("loaded client configuration from {}", path.display());
        Ok(config)
    }
}
