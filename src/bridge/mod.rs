//! # Schema Bridge Module
//!
//! Converts classes and instances between the three object representations and
//! projects classes into JSON-Schema and tool-description envelopes.
//!
//! ## Overview
//!
//! | Operation | Entry point |
//! |-----------|-------------|
//! | class → class | [`SchemaBridge::convert_class`] |
//! | instance → instance | [`SchemaBridge::convert_instance`] |
//! | class → JSON-Schema | [`SchemaBridge::json_schema`] |
//! | class → tool envelope | [`SchemaBridge::tool_spec`] |
//! | payload check | [`SchemaBridge::validate_json`] |
//!
//! ## Caching
//!
//! Every generated class and schema is memoized by source [`ClassId`]
//! (plus strictness for schemas). A lookup returns the very same `Arc`
//! every time, so identity checks on nested field types keep working. Tables
//! are append-only during normal operation; [`SchemaBridge::clear`] resets
//! them for test isolation.
//!
//! ## Shared instance
//!
//! [`SchemaBridge::global`] is built lazily from [`BridgeConfig::from_env`].
//! Tests should prefer [`SchemaBridge::new`] for an isolated cache.
//!
//! [`ClassId`]: crate::types::ClassId

mod cache;
mod class;
mod instance;
mod schema;
mod tool;

pub use tool::ToolFormat;

use crate::config::BridgeConfig;
use crate::types::ModelKind;
use cache::ConversionCache;
use once_cell::sync::Lazy;
use std::sync::Arc;

static GLOBAL_BRIDGE: Lazy<Arc<SchemaBridge>> =
    Lazy::new(|| Arc::new(SchemaBridge::new(BridgeConfig::from_env())));

/// A conversion direction between two representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    DomainToHost,
    HostToDomain,
    DomainToRecord,
    RecordToDomain,
}

impl Direction {
    #[must_use]
    pub fn source_kind(self) -> ModelKind {
        match self {
            Direction::DomainToHost | Direction::DomainToRecord => ModelKind::Domain,
            Direction::HostToDomain => ModelKind::Host,
            Direction::RecordToDomain => ModelKind::Record,
        }
    }

    #[must_use]
    pub fn target_kind(self) -> ModelKind {
        self.reverse().source_kind()
    }

    #[must_use]
    pub fn reverse(self) -> Direction {
        match self {
            Direction::DomainToHost => Direction::HostToDomain,
            Direction::HostToDomain => Direction::DomainToHost,
            Direction::DomainToRecord => Direction::RecordToDomain,
            Direction::RecordToDomain => Direction::DomainToRecord,
        }
    }

    /// Name suffix of classes generated in this direction
    fn suffix(self) -> &'static str {
        match self {
            Direction::DomainToHost => "Model",
            Direction::DomainToRecord => "Record",
            Direction::HostToDomain | Direction::RecordToDomain => "",
        }
    }
}

/// Cached converter between domain, host and record classes.
pub struct SchemaBridge {
    config: BridgeConfig,
    cache: ConversionCache,
}

impl std::fmt::Debug for SchemaBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaBridge")
            .field("config", &self.config)
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

impl Default for SchemaBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl SchemaBridge {
    /// Isolated bridge with its own empty cache
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            cache: ConversionCache::default(),
        }
    }

    /// The process-wide bridge
    #[must_use]
    pub fn global() -> Arc<SchemaBridge> {
        Arc::clone(&GLOBAL_BRIDGE)
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Number of memoized classes, schemas and validators
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Drop every memoized class, schema and validator.
    ///
    /// Classes handed out before the call stay valid but will no longer be
    /// returned by later lookups.
    pub fn clear(&self) {
        self.cache.clear();
        tracing::debug!("Schema bridge caches cleared");
    }
}

/// `PetOwner` → `pet_owner`
pub(crate) fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_reverse_pairs() {
        for d in [
            Direction::DomainToHost,
            Direction::HostToDomain,
            Direction::DomainToRecord,
            Direction::RecordToDomain,
        ] {
            assert_eq!(d.reverse().reverse(), d);
            assert_eq!(d.reverse().source_kind(), d.target_kind());
        }
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("PetOwner"), "pet_owner");
        assert_eq!(snake_case("Search2Query"), "search2_query");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }
}
