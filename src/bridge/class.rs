use super::{Direction, SchemaBridge};
use crate::error::ClassConversionTypeError;
use crate::types::{DefaultFactory, FieldDef, FieldDefault, ModelClass, ModelClassBuilder, ModelKind, TypeRef};
use crate::value::Value;
use std::sync::Arc;
use tracing::debug;

impl SchemaBridge {
    /// Generated class of `direction`'s target kind mirroring `source`.
    ///
    /// Returns the cached class when one was already published for `source`.
    /// Fails when `source` is not of the direction's source kind, or when a
    /// field still carries an unresolved forward reference.
    pub fn convert_class(
        &self,
        source: &Arc<ModelClass>,
        direction: Direction,
    ) -> Result<Arc<ModelClass>, ClassConversionTypeError> {
        if source.kind != direction.source_kind() {
            return Err(ClassConversionTypeError::new(
                format!("{} class", direction.source_kind()),
                format!("{} class `{}`", source.kind, source.name),
            ));
        }

        if let Some(hit) = self.cache.class(direction, source.id()) {
            debug!(direction = ?direction, class = %source.name, "Class conversion cache hit");
            return Ok(hit);
        }

        debug!(direction = ?direction, class = %source.name, "Class conversion cache miss");
        let mut builder = ModelClassBuilder::new(target_name(&source.name, direction), direction.target_kind())
            .generated_from(source.id());
        if let Some(d) = &source.description {
            builder = builder.description(d.clone());
        }
        for field in &source.fields {
            builder = builder.field_def(FieldDef {
                name: field.name.clone(),
                ty: self.convert_type(&field.ty, direction)?,
                default: self.convert_default(&field.name, &field.default, direction)?,
                description: field.description.clone(),
            });
        }

        Ok(self.cache.publish_class(direction, source, builder.build()))
    }

    /// Host model class for a domain class
    pub fn to_host_class(&self, domain: &Arc<ModelClass>) -> Result<Arc<ModelClass>, ClassConversionTypeError> {
        self.convert_class(domain, Direction::DomainToHost)
    }

    /// Domain class for a host model class
    pub fn to_domain_class(&self, host: &Arc<ModelClass>) -> Result<Arc<ModelClass>, ClassConversionTypeError> {
        self.convert_class(host, Direction::HostToDomain)
    }

    /// Plain record class for a domain class
    pub fn to_record_class(&self, domain: &Arc<ModelClass>) -> Result<Arc<ModelClass>, ClassConversionTypeError> {
        self.convert_class(domain, Direction::DomainToRecord)
    }

    /// Domain class for a plain record class
    pub fn record_to_domain_class(
        &self,
        record: &Arc<ModelClass>,
    ) -> Result<Arc<ModelClass>, ClassConversionTypeError> {
        self.convert_class(record, Direction::RecordToDomain)
    }

    /// Rewrite a field type for the target representation.
    ///
    /// Classes of the source kind are converted (recursively, cached);
    /// containers, `Optional` and union members are rewritten element-wise;
    /// scalars and primitive wrappers are kept as declared.
    pub fn convert_type(&self, ty: &TypeRef, direction: Direction) -> Result<TypeRef, ClassConversionTypeError> {
        Ok(match ty {
            TypeRef::Model(c) if c.kind == direction.source_kind() => {
                TypeRef::Model(self.convert_class(c, direction)?)
            }
            TypeRef::List(t) => TypeRef::list(self.convert_type(t, direction)?),
            TypeRef::Set(t) => TypeRef::set(self.convert_type(t, direction)?),
            TypeRef::Map(t) => TypeRef::map(self.convert_type(t, direction)?),
            TypeRef::Optional(t) => TypeRef::optional(self.convert_type(t, direction)?),
            TypeRef::Union(ts) => TypeRef::Union(
                ts.iter()
                    .map(|t| self.convert_type(t, direction))
                    .collect::<Result<_, _>>()?,
            ),
            TypeRef::Named(name) => {
                return Err(ClassConversionTypeError::new(
                    "resolved type",
                    format!("forward reference '{name}'"),
                ))
            }
            other => other.clone(),
        })
    }

    /// Container literals become per-instance factories; nested source-kind
    /// instances are converted once and then cloned per instance.
    ///
    /// A factory whose output holds source-kind instances is sampled once and
    /// its converted output cloned per instance. Other factories are kept.
    fn convert_default(
        &self,
        field: &str,
        default: &FieldDefault,
        direction: Direction,
    ) -> Result<FieldDefault, ClassConversionTypeError> {
        let template = match default {
            FieldDefault::Value(
                v @ (Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Object(_)),
            ) => v.clone(),
            FieldDefault::Factory(factory) => {
                let sample = factory.produce();
                if !holds_kind(&sample, direction.source_kind()) {
                    return Ok(default.clone());
                }
                sample
            }
            other => return Ok(other.clone()),
        };
        let converted = self.convert_value(template, direction).map_err(|err| {
            ClassConversionTypeError::new(
                format!("default for field `{field}` convertible to a {}", direction.target_kind()),
                err.to_string(),
            )
        })?;
        Ok(FieldDefault::Factory(DefaultFactory::cloning(converted)))
    }
}

/// Whether `value` contains an instance of `kind` at any depth
fn holds_kind(value: &Value, kind: ModelKind) -> bool {
    match value {
        Value::Object(inst) => inst.class().kind == kind || inst.fields().values().any(|v| holds_kind(v, kind)),
        Value::List(items) | Value::Set(items) => items.iter().any(|v| holds_kind(v, kind)),
        Value::Map(m) => m.values().any(|v| holds_kind(v, kind)),
        _ => false,
    }
}

fn target_name(source: &str, direction: Direction) -> String {
    match direction {
        Direction::DomainToHost | Direction::DomainToRecord => format!("{source}{}", direction.suffix()),
        Direction::HostToDomain => source.strip_suffix("Model").filter(|s| !s.is_empty()).unwrap_or(source).to_string(),
        Direction::RecordToDomain => source.strip_suffix("Record").filter(|s| !s.is_empty()).unwrap_or(source).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrimitiveType, ScalarKind};
    use crate::value::Instance;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_nested_classes_convert_and_cache() {
        let bridge = SchemaBridge::default();
        let tag = ModelClass::domain("Tag").field("label", TypeRef::string()).build();
        let pet = ModelClass::domain("Pet")
            .field("tags", TypeRef::list(TypeRef::model(&tag)))
            .field("best", TypeRef::optional(TypeRef::model(&tag)))
            .build();

        let host = bridge.to_host_class(&pet).unwrap();
        assert_eq!(host.name, "PetModel");
        assert_eq!(host.kind, ModelKind::Host);
        assert_eq!(host.generated_from, Some(pet.id()));

        let tag_host = bridge.to_host_class(&tag).unwrap();
        let expected = TypeRef::list(TypeRef::model(&tag_host));
        assert_eq!(host.field("tags").unwrap().ty, expected);
        assert!(Arc::ptr_eq(&host, &bridge.to_host_class(&pet).unwrap()));
    }

    #[test]
    fn test_reverse_lookup_returns_source() {
        let bridge = SchemaBridge::default();
        let pet = ModelClass::domain("Pet").field("name", TypeRef::string()).build();
        let host = bridge.to_host_class(&pet).unwrap();
        assert!(Arc::ptr_eq(&bridge.to_domain_class(&host).unwrap(), &pet));
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let bridge = SchemaBridge::default();
        let host = ModelClass::host("PetModel").field("name", TypeRef::string()).build();
        let err = bridge.to_host_class(&host).unwrap_err();
        assert_eq!(err.expected, "domain class");
        assert!(err.received.contains("host model class"));
    }

    #[test]
    fn test_primitive_fields_are_kept() {
        let bridge = SchemaBridge::default();
        let id = PrimitiveType::new("UserId", ScalarKind::Integer).minimum(1.0).build();
        let user = ModelClass::domain("User").field("id", TypeRef::primitive(&id)).build();
        let record = bridge.to_record_class(&user).unwrap();
        assert_eq!(record.name, "UserRecord");
        assert_eq!(record.field("id").unwrap().ty, TypeRef::primitive(&id));
    }

    #[test]
    fn test_unresolved_field_fails() {
        let bridge = SchemaBridge::default();
        let broken = ModelClass::domain("Broken").field("later", TypeRef::named("Later")).build();
        assert!(bridge.to_host_class(&broken).is_err());
    }

    #[test]
    fn test_target_names() {
        assert_eq!(target_name("Pet", Direction::DomainToHost), "PetModel");
        assert_eq!(target_name("PetModel", Direction::HostToDomain), "Pet");
        assert_eq!(target_name("Model", Direction::HostToDomain), "Model");
        assert_eq!(target_name("PetRecord", Direction::RecordToDomain), "Pet");
    }

    #[test]
    fn test_factory_default_with_nested_instance_is_converted() {
        let bridge = SchemaBridge::default();
        let tag = ModelClass::domain("Tag").field("label", TypeRef::string()).build();
        let template = Instance::from_json(&tag, &json!({"label": "new"})).unwrap();
        let owner = ModelClass::domain("Owner")
            .field_def(FieldDef {
                name: "tag".to_string(),
                ty: TypeRef::model(&tag),
                default: FieldDefault::Factory(DefaultFactory::new(move || Value::Object(template.clone()))),
                description: None,
            })
            .build();
        assert!(Instance::new(&owner, BTreeMap::new()).is_ok());

        for direction in [Direction::DomainToHost, Direction::DomainToRecord] {
            let target = bridge.convert_class(&owner, direction).unwrap();
            let inst = Instance::new(&target, BTreeMap::new()).unwrap();
            let Some(Value::Object(nested)) = inst.get("tag") else {
                panic!("expected a nested instance");
            };
            assert_eq!(nested.class().kind, direction.target_kind());
            assert_eq!(nested.get("label"), Some(&Value::Str("new".into())));
        }
    }

    #[test]
    fn test_scalar_factory_is_kept() {
        let bridge = SchemaBridge::default();
        let counter = ModelClass::domain("Counter")
            .field_def(FieldDef {
                name: "start".to_string(),
                ty: TypeRef::integer(),
                default: FieldDefault::Factory(DefaultFactory::new(|| Value::Int(3))),
                description: None,
            })
            .build();
        let host = bridge.to_host_class(&counter).unwrap();
        let inst = Instance::new(&host, BTreeMap::new()).unwrap();
        assert_eq!(inst.get("start"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_unconvertible_default_fails_class_conversion() {
        let bridge = SchemaBridge::default();
        let broken = ModelClass::domain("Broken")
            .field_with_default("later", TypeRef::optional(TypeRef::named("Later")), Value::Null)
            .build();
        let sample = Instance::new(&broken, BTreeMap::new()).unwrap();
        let owner = ModelClass::domain("Owner")
            .field_with_default("extra", TypeRef::any(), Value::Object(sample))
            .build();

        let err = bridge.to_host_class(&owner).unwrap_err();
        assert!(err.expected.contains("default for field `extra`"), "{err}");
        assert!(err.received.contains("Later"), "{err}");
    }
}
