//! Filter sets passed to the list endpoints

use crate::error::{Result, SwarmctlError};
use std::collections::{BTreeMap, BTreeSet};

/// Filters for list calls, keyed by filter name (`name`, `label`, `id`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    fields: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSet {
    /// Create an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build filters from `key=value` flag values
    pub fn parse<S: AsRef<str>>(flags: &[S]) -> Result<Self> {
        let mut filters = Self::new();
        for flag in flags {
            let flag = flag.as_ref();
            let (key, value) = flag
                .split_once('=')
                .ok_or_else(|| SwarmctlError::BadFilter(flag.to_string()))?;
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                return Err(SwarmctlError::BadFilter(flag.to_string()));
            }
            filters.add(&key, value.trim());
        }
        Ok(filters)
    }

    /// Add a value under `key`
    pub fn add(&mut self, key: &str, value: &str) {
        self.fields
            .entry(key.to_string())
            .or_default()
            .insert(value.to_string());
    }

    /// Builder-style [`FilterSet::add`]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.add(key, value);
        self
    }

    /// Values registered under `key`, in sorted order
    pub fn get(&self, key: &str) -> Vec<String> {
        self.fields
            .get(key)
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode as the `filters` query parameter, `{"key":{"value":true}}`
    pub fn to_json(&self) -> String {
        let encoded: BTreeMap<&str, BTreeMap<&str, bool>> = self
            .fields
            .iter()
            .map(|(key, values)| {
                (
                    key.as_str(),
                    values.iter().map(|v| (v.as_str(), true)).collect(),
                )
            })
            .collect();
        serde_json::to_string(&encoded).unwrap_or_else(|_| "{}".to_string())
    }
}
