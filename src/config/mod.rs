//! Validator configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::policy::{PolicyOverrides, ValidationPolicy};

/// Destination key used when none is configured
pub const DEFAULT_DESTINATION_KEY: &str = "parsedQuery";

/// Construction-time options for a query param validator
///
/// # Example
/// ```yaml
/// destinationKey: paging
/// policyOverrides:
///   allowUnknown: true
///   presence: optional
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Where the validated object is stored on the request
    pub destination_key: Option<String>,

    /// Policy fields that replace the defaults
    pub policy_overrides: PolicyOverrides,
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination_key(mut self, key: impl Into<String>) -> Self {
        self.destination_key = Some(key.into());
        self
    }

    pub fn with_policy_overrides(mut self, overrides: PolicyOverrides) -> Self {
        self.policy_overrides = overrides;
        self
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Configured destination key, falling back to the default when unset or empty
    pub fn destination_key(&self) -> &str {
        match self.destination_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => DEFAULT_DESTINATION_KEY,
        }
    }

    /// Defaults with this config's overrides applied
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy::default().merge(&self.policy_overrides)
    }
}
