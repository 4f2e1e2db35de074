//! # Configuration Module
//!
//! Settings that change what the schema bridge emits.
//!
//! ## Sources
//!
//! - [`BridgeConfig::from_env`] reads environment variables; the process-wide
//!   bridge is built this way on first use.
//! - [`BridgeConfig::from_yaml_str`] / [`BridgeConfig::load`] read YAML. Missing
//!   keys fall back to their defaults.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Field |
//! |----------|---------|-------|
//! | `ROUTEBRIDGE_SCHEMA_DEFAULTS` | `true` | [`BridgeConfig::include_defaults`] |
//! | `ROUTEBRIDGE_STRICT_TOOLS` | `false` | [`BridgeConfig::strict_tool_schemas`] |
//! | `ROUTEBRIDGE_SCHEMA_DIALECT` | draft-07 | [`BridgeConfig::schema_dialect`] |
//!
//! ```rust
//! use routebridge::config::BridgeConfig;
//!
//! let config = BridgeConfig::from_yaml_str("include_defaults: false").unwrap();
//! assert!(!config.include_defaults);
//! assert!(!config.strict_tool_schemas);
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// `$schema` URI of JSON Schema draft 7
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Emit `default` keywords in generated JSON-Schema
    pub include_defaults: bool,
    /// Strictness of tool envelopes when the caller does not choose one
    pub strict_tool_schemas: bool,
    /// Value of the top-level `$schema` keyword
    pub schema_dialect: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            strict_tool_schemas: false,
            schema_dialect: DRAFT_07.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            include_defaults: get("ROUTEBRIDGE_SCHEMA_DEFAULTS")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.include_defaults),
            strict_tool_schemas: get("ROUTEBRIDGE_STRICT_TOOLS")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.strict_tool_schemas),
            schema_dialect: get("ROUTEBRIDGE_SCHEMA_DIALECT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.schema_dialect),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Failed to parse bridge config YAML")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bridge config {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid bridge config {}", path.display()))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert!(config.include_defaults);
        assert!(!config.strict_tool_schemas);
        assert_eq!(config.schema_dialect, DRAFT_07);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("ROUTEBRIDGE_SCHEMA_DEFAULTS", "off"),
            ("ROUTEBRIDGE_STRICT_TOOLS", "1"),
            ("ROUTEBRIDGE_SCHEMA_DIALECT", "  "),
        ]
        .into_iter()
        .collect();
        let config = BridgeConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()));
        assert!(!config.include_defaults);
        assert!(config.strict_tool_schemas);
        assert_eq!(config.schema_dialect, DRAFT_07);
    }

    #[test]
    fn test_invalid_bool_falls_back() {
        let config = BridgeConfig::from_lookup(|k| {
            (k == "ROUTEBRIDGE_STRICT_TOOLS").then(|| "maybe".to_string())
        });
        assert!(!config.strict_tool_schemas);
    }

    #[test]
    fn test_yaml_partial_and_unknown_type() {
        let config = BridgeConfig::from_yaml_str("strict_tool_schemas: true\n").unwrap();
        assert!(config.strict_tool_schemas);
        assert!(config.include_defaults);
        assert!(BridgeConfig::from_yaml_str("include_defaults: [1, 2]").is_err());
        assert_eq!(BridgeConfig::from_yaml_str("").unwrap(), BridgeConfig::default());
    }
}
