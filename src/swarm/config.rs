//! Docker Config objects
//!
//! Configs hold non-sensitive configuration data distributed by the swarm
//! manager. The payload travels base64-encoded in `Spec.Data`.

use super::Version;
use crate::error::{Result, SwarmctlError};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Docker Config specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigSpec {
    /// Config name
    #[serde(default)]
    pub name: String,
    /// Labels
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Base64-encoded config data
    #[serde(default)]
    pub data: String,
    /// Templating configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templating: Option<ConfigTemplating>,
}

/// Config templating options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigTemplating {
    /// Templating engine name (e.g., "golang")
    pub name: Option<String>,
    /// Templating options
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Docker Config object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Config ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Config version
    #[serde(default)]
    pub version: Version,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    /// Config specification
    #[serde(default)]
    pub spec: ConfigSpec,
}

impl Config {
    /// Get the raw config data (base64 decoded)
    pub fn get_data(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.spec.data)
            .map_err(|e| SwarmctlError::InvalidConfig(format!("Invalid base64 data: {}", e)))
    }

    /// Get the config data as text, replacing invalid UTF-8 sequences
    pub fn get_data_string(&self) -> Result<String> {
        let bytes = self.get_data()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Replace the payload with `data`, encoding it for the wire
    pub fn set_data(&mut self, data: &[u8]) {
        self.spec.data = base64::engine::general_purpose::STANDARD.encode(data);
    }
}
