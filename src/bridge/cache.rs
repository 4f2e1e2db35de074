//! Publish-once memoization tables for generated classes and schemas.

use super::Direction;
use crate::types::{ClassId, ModelClass};
use dashmap::DashMap;
use jsonschema::Validator;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Key of the schema and validator tables: source class plus strictness
pub(crate) type SchemaKey = (ClassId, bool);

/// One table per conversion direction, plus schema and validator tables.
///
/// Lookups never hold a shard lock while a value is synthesized: synthesis
/// recurses into nested classes and may touch the same table. Concurrent
/// misses may both synthesize; `entry().or_insert` keeps the first published
/// value and every caller returns that one.
#[derive(Default)]
pub(crate) struct ConversionCache {
    domain_to_host: DashMap<ClassId, Arc<ModelClass>>,
    host_to_domain: DashMap<ClassId, Arc<ModelClass>>,
    domain_to_record: DashMap<ClassId, Arc<ModelClass>>,
    record_to_domain: DashMap<ClassId, Arc<ModelClass>>,
    schemas: DashMap<SchemaKey, Arc<JsonValue>>,
    validators: DashMap<SchemaKey, Arc<Validator>>,
}

impl ConversionCache {
    fn table(&self, direction: Direction) -> &DashMap<ClassId, Arc<ModelClass>> {
        match direction {
            Direction::DomainToHost => &self.domain_to_host,
            Direction::HostToDomain => &self.host_to_domain,
            Direction::DomainToRecord => &self.domain_to_record,
            Direction::RecordToDomain => &self.record_to_domain,
        }
    }

    pub(crate) fn class(&self, direction: Direction, source: ClassId) -> Option<Arc<ModelClass>> {
        self.table(direction).get(&source).map(|hit| Arc::clone(hit.value()))
    }

    /// Publish `generated` unless another caller got there first; returns the winner.
    ///
    /// The winner is also published in the reverse table so converting it back
    /// yields the original source class.
    pub(crate) fn publish_class(
        &self,
        direction: Direction,
        source: &Arc<ModelClass>,
        generated: Arc<ModelClass>,
    ) -> Arc<ModelClass> {
        let winner = Arc::clone(
            self.table(direction)
                .entry(source.id())
                .or_insert(generated)
                .value(),
        );
        self.table(direction.reverse())
            .entry(winner.id())
            .or_insert_with(|| Arc::clone(source));
        debug!(
            direction = ?direction,
            source = %source.name,
            source_id = %source.id(),
            generated = %winner.name,
            generated_id = %winner.id(),
            "Published generated class"
        );
        winner
    }

    pub(crate) fn schema(&self, key: SchemaKey) -> Option<Arc<JsonValue>> {
        self.schemas.get(&key).map(|hit| Arc::clone(hit.value()))
    }

    pub(crate) fn publish_schema(&self, key: SchemaKey, schema: JsonValue) -> Arc<JsonValue> {
        Arc::clone(self.schemas.entry(key).or_insert_with(|| Arc::new(schema)).value())
    }

    pub(crate) fn validator(&self, key: SchemaKey) -> Option<Arc<Validator>> {
        self.validators.get(&key).map(|hit| Arc::clone(hit.value()))
    }

    pub(crate) fn publish_validator(&self, key: SchemaKey, validator: Validator) -> Arc<Validator> {
        Arc::clone(
            self.validators
                .entry(key)
                .or_insert_with(|| Arc::new(validator))
                .value(),
        )
    }

    /// Number of entries across all tables
    pub(crate) fn len(&self) -> usize {
        self.domain_to_host.len()
            + self.host_to_domain.len()
            + self.domain_to_record.len()
            + self.record_to_domain.len()
            + self.schemas.len()
            + self.validators.len()
    }

    pub(crate) fn clear(&self) {
        self.domain_to_host.clear();
        self.host_to_domain.clear();
        self.domain_to_record.clear();
        self.record_to_domain.clear();
        self.schemas.clear();
        self.validators.clear();
    }
}
