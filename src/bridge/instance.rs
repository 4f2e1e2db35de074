use super::{Direction, SchemaBridge};
use crate::error::{BridgeError, ClassConversionTypeError};
use crate::value::{Instance, Value};
use std::collections::BTreeMap;

impl SchemaBridge {
    /// Convert an instance of the direction's source kind into its target
    /// representation, recursing into nested instances and containers.
    ///
    /// The top-level value must be an instance of the source kind; anything
    /// else is a [`ClassConversionTypeError`].
    pub fn convert_instance(&self, value: Value, direction: Direction) -> Result<Value, BridgeError> {
        match &value {
            Value::Object(inst) if inst.class().kind == direction.source_kind() => {}
            other => {
                return Err(ClassConversionTypeError::new(
                    format!("{} instance", direction.source_kind()),
                    other.kind_name(),
                )
                .into())
            }
        }
        self.convert_value(value, direction)
    }

    /// Element-wise conversion of any value; `Null` and foreign values pass through
    pub(crate) fn convert_value(&self, value: Value, direction: Direction) -> Result<Value, BridgeError> {
        Ok(match value {
            Value::Object(inst) if inst.class().kind == direction.source_kind() => {
                let target = self.convert_class(inst.class(), direction)?;
                let mut fields = BTreeMap::new();
                for (name, v) in inst.into_fields() {
                    // records may carry attributes the strict target does not declare
                    if direction == Direction::RecordToDomain && target.field(&name).is_none() {
                        continue;
                    }
                    fields.insert(name, self.convert_value(v, direction)?);
                }
                Value::Object(Instance::new(&target, fields)?)
            }
            Value::List(items) => Value::List(self.convert_items(items, direction)?),
            Value::Set(items) => Value::Set(self.convert_items(items, direction)?),
            Value::Map(m) => Value::Map(
                m.into_iter()
                    .map(|(k, v)| self.convert_value(v, direction).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
            other => other,
        })
    }

    fn convert_items(&self, items: Vec<Value>, direction: Direction) -> Result<Vec<Value>, BridgeError> {
        items
            .into_iter()
            .map(|v| self.convert_value(v, direction))
            .collect()
    }

    /// Domain instance → host model instance
    pub fn to_host_instance(&self, domain: Value) -> Result<Value, BridgeError> {
        self.convert_instance(domain, Direction::DomainToHost)
    }

    /// Host model instance → domain instance
    pub fn to_domain_instance(&self, host: Value) -> Result<Value, BridgeError> {
        self.convert_instance(host, Direction::HostToDomain)
    }

    /// Domain instance → plain record
    pub fn to_record(&self, domain: Value) -> Result<Value, BridgeError> {
        self.convert_instance(domain, Direction::DomainToRecord)
    }

    /// Plain record → domain instance (validated)
    pub fn record_to_domain(&self, record: Value) -> Result<Value, BridgeError> {
        self.convert_instance(record, Direction::RecordToDomain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModelClass, ModelKind, TypeRef};
    use serde_json::json;

    #[test]
    fn test_nested_instance_converts_elementwise() {
        let bridge = SchemaBridge::default();
        let tag = ModelClass::domain("Tag").field("label", TypeRef::string()).build();
        let pet = ModelClass::domain("Pet")
            .field("tags", TypeRef::map(TypeRef::model(&tag)))
            .field("owner", TypeRef::optional(TypeRef::model(&tag)))
            .build();
        let src = Instance::from_json(&pet, &json!({"tags": {"a": {"label": "x"}}, "owner": null})).unwrap();

        let host = bridge.to_host_instance(Value::Object(src.clone())).unwrap();
        let Value::Object(host_inst) = &host else {
            panic!("expected instance");
        };
        assert_eq!(host_inst.class().kind, ModelKind::Host);
        let Some(Value::Map(tags)) = host_inst.get("tags") else {
            panic!("tags missing");
        };
        assert!(matches!(&tags["a"], Value::Object(t) if t.class().kind == ModelKind::Host));
        assert_eq!(host_inst.get("owner"), Some(&Value::Null));

        let back = bridge.to_domain_instance(host).unwrap();
        assert_eq!(back, Value::Object(src));
    }

    #[test]
    fn test_top_level_must_be_source_instance() {
        let bridge = SchemaBridge::default();
        let err = bridge.to_host_instance(Value::Int(3)).unwrap_err();
        assert!(matches!(err, BridgeError::ClassType(_)));
    }

    #[test]
    fn test_invalid_record_fails_domain_validation() {
        let bridge = SchemaBridge::default();
        let pet = ModelClass::domain("Pet").field("age", TypeRef::integer()).build();
        let record_class = bridge.to_record_class(&pet).unwrap();
        let record = Instance::from_json(&record_class, &json!({"age": "old", "note": 1})).unwrap();
        let err = bridge.record_to_domain(Value::Object(record)).unwrap_err();
        let BridgeError::Validation(v) = err else {
            panic!("expected validation error");
        };
        assert_eq!(v.issues.len(), 1);
        assert_eq!(v.issues[0].loc, vec!["age".to_string()]);
    }
}
