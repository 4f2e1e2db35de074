use super::SchemaBridge;
use crate::types::{FieldDef, FieldDefault, ModelClass, PrimitiveType, ScalarKind, TypeRef};
use jsonschema::Draft;
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use tracing::debug;

impl SchemaBridge {
    /// JSON-Schema document for `class`, memoized per `(class, strict)`.
    ///
    /// Top level: `$schema`, `title`, `type: object`, `properties`, `required`
    /// and `additionalProperties: false`. Nested classes are inlined without
    /// `$schema`. With `strict`, every property is listed as required.
    pub fn json_schema(&self, class: &Arc<ModelClass>, strict: bool) -> Arc<JsonValue> {
        let key = (class.id(), strict);
        if let Some(hit) = self.cache.schema(key) {
            return hit;
        }
        debug!(class = %class.name, strict, "Generating JSON schema");

        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &class.fields {
            properties.insert(field.name.clone(), self.property_schema(field, strict));
            if strict || field.default.is_required() {
                required.push(JsonValue::String(field.name.clone()));
            }
        }

        let mut doc = Map::new();
        doc.insert("$schema".into(), json!(self.config.schema_dialect));
        doc.insert("title".into(), json!(class.name));
        doc.insert("type".into(), json!("object"));
        if let Some(d) = &class.description {
            doc.insert("description".into(), json!(d));
        }
        doc.insert("properties".into(), JsonValue::Object(properties));
        doc.insert("required".into(), JsonValue::Array(required));
        doc.insert("additionalProperties".into(), JsonValue::Bool(false));

        self.cache.publish_schema(key, JsonValue::Object(doc))
    }

    fn property_schema(&self, field: &FieldDef, strict: bool) -> JsonValue {
        let mut schema = self.type_schema(&field.ty, strict);
        if let JsonValue::Object(obj) = &mut schema {
            if let Some(d) = &field.description {
                obj.insert("description".into(), json!(d));
            }
            if self.config.include_defaults {
                match &field.default {
                    FieldDefault::Required => {}
                    FieldDefault::Value(v) => {
                        obj.insert("default".into(), v.to_json());
                    }
                    FieldDefault::Factory(f) => {
                        obj.insert("default".into(), f.produce().to_json());
                    }
                }
            }
        }
        schema
    }

    /// Schema fragment for a declared type
    pub fn type_schema(&self, ty: &TypeRef, strict: bool) -> JsonValue {
        match ty {
            TypeRef::Scalar(kind) => scalar_schema(*kind),
            TypeRef::Primitive(p) => primitive_schema(p),
            TypeRef::Model(c) => {
                let mut nested = (*self.json_schema(c, strict)).clone();
                if let JsonValue::Object(obj) = &mut nested {
                    obj.remove("$schema");
                }
                nested
            }
            TypeRef::List(t) => json!({"type": "array", "items": self.type_schema(t, strict)}),
            TypeRef::Set(t) => json!({
                "type": "array",
                "items": self.type_schema(t, strict),
                "uniqueItems": true,
            }),
            TypeRef::Map(t) => json!({
                "type": "object",
                "additionalProperties": self.type_schema(t, strict),
            }),
            TypeRef::Optional(t) => nullable(self.type_schema(t, strict)),
            TypeRef::Union(ts) => json!({
                "oneOf": ts.iter().map(|t| self.type_schema(t, strict)).collect::<Vec<_>>(),
            }),
            TypeRef::Response | TypeRef::Named(_) => json!({}),
        }
    }

    /// Validate `instance` against the class's schema; returns every message.
    ///
    /// The compiled validator is cached next to the schema. A schema the
    /// validator cannot compile is reported as a single message.
    pub fn validate_json(
        &self,
        class: &Arc<ModelClass>,
        strict: bool,
        instance: &JsonValue,
    ) -> Result<(), Vec<String>> {
        let key = (class.id(), strict);
        let validator = match self.cache.validator(key) {
            Some(v) => v,
            None => {
                let schema = self.json_schema(class, strict);
                let compiled = jsonschema::options()
                    .with_draft(Draft::Draft7)
                    .build(&schema)
                    .map_err(|e| vec![format!("invalid schema for {}: {e}", class.name)])?;
                self.cache.publish_validator(key, compiled)
            }
        };

        if validator.is_valid(instance) {
            return Ok(());
        }
        Err(validator.iter_errors(instance).map(|e| e.to_string()).collect())
    }
}

fn scalar_schema(kind: ScalarKind) -> JsonValue {
    match kind.json_type() {
        Some(t) => json!({ "type": t }),
        None => json!({}),
    }
}

fn primitive_schema(p: &PrimitiveType) -> JsonValue {
    let mut schema = Map::new();
    if let Some(t) = p.base.json_type() {
        schema.insert("type".into(), json!(t));
    }
    let c = &p.constraints;
    let integral = p.base == ScalarKind::Integer;
    if let Some(min) = c.minimum {
        schema.insert("minimum".into(), bound(min, integral));
    }
    if let Some(max) = c.maximum {
        schema.insert("maximum".into(), bound(max, integral));
    }
    if let Some(n) = c.min_length {
        schema.insert("minLength".into(), json!(n));
    }
    if let Some(n) = c.max_length {
        schema.insert("maxLength".into(), json!(n));
    }
    if let Some(re) = &c.pattern {
        schema.insert("pattern".into(), json!(re.as_str()));
    }
    if let Some(d) = &p.description {
        schema.insert("description".into(), json!(d));
    }
    JsonValue::Object(schema)
}

#[allow(clippy::cast_possible_truncation)]
fn bound(v: f64, integral: bool) -> JsonValue {
    if integral && v.fract() == 0.0 {
        json!(v as i64)
    } else {
        json!(v)
    }
}

/// `type: [t, "null"]` when the fragment has a single string type, `anyOf` otherwise
fn nullable(mut schema: JsonValue) -> JsonValue {
    if let JsonValue::Object(obj) = &mut schema {
        if let Some(JsonValue::String(t)) = obj.get("type") {
            let t = t.clone();
            obj.insert("type".into(), json!([t, "null"]));
            return schema;
        }
        if obj.is_empty() {
            return schema;
        }
    }
    json!({"anyOf": [schema, {"type": "null"}]})
}
