//! # Value Module
//!
//! Runtime values flowing through handlers and converters.
//!
//! A [`Value`] is JSON-like, plus three variants that keep type identity:
//! [`Value::Primitive`] (a scalar validated by a [`PrimitiveType`]),
//! [`Value::Object`] (an [`Instance`] of a [`ModelClass`]) and
//! [`Value::Response`] (a host response that must pass through untouched).
//!
//! [`Instance::new`] is where model validation happens: domain classes are
//! strict (unknown fields rejected), host models validate but ignore unknown
//! fields, records store whatever they are given.

use crate::error::{FieldIssue, ValidationError};
use crate::router::HostResponse;
use crate::types::{ModelClass, ModelKind, PrimitiveType, ScalarKind, TypeRef};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Unique elements in insertion order
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Primitive(PrimitiveValue),
    Object(Instance),
    Response(Arc<HostResponse>),
}

/// A scalar validated by a primitive wrapper.
#[derive(Debug, Clone)]
pub struct PrimitiveValue {
    pub ty: Arc<PrimitiveType>,
    /// The base scalar
    pub value: Box<Value>,
}

impl PartialEq for PrimitiveValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.same_rules(&other.ty) && self.value == other.value
    }
}

impl PrimitiveValue {
    /// The underlying scalar
    #[must_use]
    pub fn into_base(self) -> Value {
        *self.value
    }
}

impl Value {
    /// Short description of the variant, used in error messages
    #[must_use]
    pub fn kind_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "boolean".to_string(),
            Value::Int(_) => "integer".to_string(),
            Value::Float(_) => "number".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Set(_) => "set".to_string(),
            Value::Map(_) => "dict".to_string(),
            Value::Primitive(p) => format!("{} value", p.ty.name),
            Value::Object(i) => format!("{} instance ({})", i.class.name, i.class.kind),
            Value::Response(_) => "response".to_string(),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Canonical JSON serialization
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::List(items) | Value::Set(items) => {
                JsonValue::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(m) => JsonValue::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Primitive(p) => p.value.to_json(),
            Value::Object(inst) => inst.to_json(),
            Value::Response(r) => r.body.clone(),
        }
    }

    /// Untyped conversion from JSON: objects become maps, arrays become lists
    #[must_use]
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Str(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            JsonValue::Object(m) => Value::Map(
                m.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Project to plain data: instances become maps, primitive wrappers their base scalar
    #[must_use]
    pub fn into_plain(self) -> Value {
        match self {
            Value::Primitive(p) => p.into_base().into_plain(),
            Value::Object(inst) => Value::Map(
                inst.fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_plain()))
                    .collect(),
            ),
            Value::List(items) => Value::List(items.into_iter().map(Value::into_plain).collect()),
            Value::Set(items) => Value::Set(items.into_iter().map(Value::into_plain).collect()),
            Value::Map(m) => Value::Map(m.into_iter().map(|(k, v)| (k, v.into_plain())).collect()),
            other => other,
        }
    }
}

/// An instance of a [`ModelClass`].
#[derive(Debug, Clone)]
pub struct Instance {
    class: Arc<ModelClass>,
    fields: BTreeMap<String, Value>,
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class.id() == other.class.id() && self.fields == other.fields
    }
}

impl Instance {
    /// Build an instance, validating according to the class kind.
    ///
    /// Missing fields take their declared default; factories run once per call.
    pub fn new(
        class: &Arc<ModelClass>,
        mut values: BTreeMap<String, Value>,
    ) -> Result<Instance, ValidationError> {
        let mut fields = BTreeMap::new();
        let mut issues = Vec::new();

        for field in &class.fields {
            let supplied = values.remove(&field.name);
            let value = match supplied {
                Some(v) => v,
                None => match field.default.produce() {
                    Some(d) => d,
                    None if class.kind == ModelKind::Record => Value::Null,
                    None => {
                        issues.push(FieldIssue {
                            loc: vec![field.name.clone()],
                            message: "field required".to_string(),
                            input: JsonValue::Null,
                        });
                        continue;
                    }
                },
            };

            if class.kind == ModelKind::Record {
                fields.insert(field.name.clone(), value);
                continue;
            }

            match coerce(&field.ty, value) {
                Ok(v) => {
                    fields.insert(field.name.clone(), v);
                }
                Err(nested) => issues.extend(nested.into_iter().map(|mut i| {
                    i.loc.insert(0, field.name.clone());
                    i
                })),
            }
        }

        match class.kind {
            ModelKind::Domain => {
                for (extra, v) in values {
                    issues.push(FieldIssue {
                        loc: vec![extra],
                        message: "extra inputs are not permitted".to_string(),
                        input: v.to_json(),
                    });
                }
            }
            ModelKind::Record => fields.extend(values),
            ModelKind::Host => {}
        }

        if issues.is_empty() {
            Ok(Instance {
                class: Arc::clone(class),
                fields,
            })
        } else {
            Err(ValidationError {
                model: class.name.clone(),
                issues,
            })
        }
    }

    /// Build an instance from a JSON object
    pub fn from_json(class: &Arc<ModelClass>, json: &JsonValue) -> Result<Instance, ValidationError> {
        match Value::from_json(json) {
            Value::Map(m) => Instance::new(class, m),
            other => Err(ValidationError {
                model: class.name.clone(),
                issues: vec![FieldIssue {
                    loc: Vec::new(),
                    message: format!("input should be a valid dictionary, got {}", other.kind_name()),
                    input: json.clone(),
                }],
            }),
        }
    }

    #[must_use]
    pub fn class(&self) -> &Arc<ModelClass> {
        &self.class
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Mutable access to a stored field, without re-validation
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn into_fields(self) -> BTreeMap<String, Value> {
        self.fields
    }

    /// Serialized form, fields in declaration order
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut out = serde_json::Map::new();
        for field in &self.class.fields {
            if let Some(v) = self.fields.get(&field.name) {
                out.insert(field.name.clone(), v.to_json());
            }
        }
        for (k, v) in &self.fields {
            if !out.contains_key(k) {
                out.insert(k.clone(), v.to_json());
            }
        }
        JsonValue::Object(out)
    }
}

fn issue(message: impl Into<String>, input: &Value) -> Vec<FieldIssue> {
    vec![FieldIssue {
        loc: Vec::new(),
        message: message.into(),
        input: input.to_json(),
    }]
}

/// Coerce `value` into `ty`, recursing into containers and nested classes.
///
/// Issues carry locations relative to `value`.
pub(crate) fn coerce(ty: &TypeRef, value: Value) -> Result<Value, Vec<FieldIssue>> {
    match ty {
        TypeRef::Scalar(ScalarKind::Any) => Ok(value),
        TypeRef::Scalar(kind) => {
            let raw = match value {
                Value::Primitive(p) => p.into_base(),
                other => other,
            };
            let snapshot = raw.to_json();
            kind.accept(raw).map_err(|message| {
                vec![FieldIssue {
                    loc: Vec::new(),
                    message,
                    input: snapshot,
                }]
            })
        }
        TypeRef::Primitive(p) => {
            let snapshot = value.to_json();
            p.validate(value).map_err(|message| {
                vec![FieldIssue {
                    loc: Vec::new(),
                    message,
                    input: snapshot,
                }]
            })
        }
        TypeRef::Model(class) => match value {
            Value::Object(inst) if inst.class.id() == class.id() => Ok(Value::Object(inst)),
            Value::Map(m) => Instance::new(class, m)
                .map(Value::Object)
                .map_err(|e| e.issues),
            other => Err(issue(
                format!(
                    "input should be a valid dictionary or instance of {}, got {}",
                    class.name,
                    other.kind_name()
                ),
                &other,
            )),
        },
        TypeRef::List(inner) => match value {
            Value::List(items) | Value::Set(items) => coerce_items(inner, items).map(Value::List),
            other => Err(issue(
                format!("input should be a valid list, got {}", other.kind_name()),
                &other,
            )),
        },
        TypeRef::Set(inner) => match value {
            Value::List(items) | Value::Set(items) => {
                let coerced = coerce_items(inner, items)?;
                let mut unique: Vec<Value> = Vec::with_capacity(coerced.len());
                for item in coerced {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(Value::Set(unique))
            }
            other => Err(issue(
                format!("input should be a valid set, got {}", other.kind_name()),
                &other,
            )),
        },
        TypeRef::Map(inner) => match value {
            Value::Map(m) => {
                let mut out = BTreeMap::new();
                let mut issues = Vec::new();
                for (k, v) in m {
                    match coerce(inner, v) {
                        Ok(v) => {
                            out.insert(k, v);
                        }
                        Err(nested) => issues.extend(nested.into_iter().map(|mut i| {
                            i.loc.insert(0, k.clone());
                            i
                        })),
                    }
                }
                if issues.is_empty() {
                    Ok(Value::Map(out))
                } else {
                    Err(issues)
                }
            }
            other => Err(issue(
                format!("input should be a valid dictionary, got {}", other.kind_name()),
                &other,
            )),
        },
        TypeRef::Optional(inner) => match value {
            Value::Null => Ok(Value::Null),
            other => coerce(inner, other),
        },
        TypeRef::Union(members) => {
            for member in members {
                if let Ok(v) = coerce(member, value.clone()) {
                    return Ok(v);
                }
            }
            Err(issue(format!("input does not match any member of {ty}"), &value))
        }
        TypeRef::Response => match value {
            v @ Value::Response(_) => Ok(v),
            other => Err(issue("input should be a response", &other)),
        },
        TypeRef::Named(name) => Err(issue(format!("unresolved type '{name}'"), &value)),
    }
}

fn coerce_items(inner: &TypeRef, items: Vec<Value>) -> Result<Vec<Value>, Vec<FieldIssue>> {
    let mut out = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (idx, item) in items.into_iter().enumerate() {
        match coerce(inner, item) {
            Ok(v) => out.push(v),
            Err(nested) => issues.extend(nested.into_iter().map(|mut i| {
                i.loc.insert(0, idx.to_string());
                i
            })),
        }
    }
    if issues.is_empty() {
        Ok(out)
    } else {
        Err(issues)
    }
}

/// Arguments of one handler invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyword argument
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl IntoValue) -> Self {
        self.keyword.insert(name.into(), value.into_value());
        self
    }

    /// Add a positional argument
    #[must_use]
    pub fn arg(mut self, value: impl IntoValue) -> Self {
        self.positional.push(value.into_value());
        self
    }

    /// Remove a keyword argument; missing arguments read as [`Value::Null`]
    pub fn take(&mut self, name: &str) -> Value {
        self.keyword.remove(name).unwrap_or(Value::Null)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }
}

/// A [`Value`] did not have the shape a Rust type needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, received {received}")]
pub struct ValueTypeError {
    pub expected: &'static str,
    pub received: String,
}

impl ValueTypeError {
    fn new(expected: &'static str, got: &Value) -> Self {
        Self {
            expected,
            received: got.kind_name(),
        }
    }
}

/// Extract a Rust value from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueTypeError>;
}

/// Turn a Rust value into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

fn unwrap_primitive(value: Value) -> Value {
    match value {
        Value::Primitive(p) => p.into_base(),
        other => other,
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        Ok(value)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match unwrap_primitive(value) {
            Value::Str(s) => Ok(s),
            other => Err(ValueTypeError::new("string", &other)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

macro_rules! integer_value {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self, ValueTypeError> {
                match unwrap_primitive(value) {
                    Value::Int(i) => <$t>::try_from(i)
                        .map_err(|_| ValueTypeError::new(stringify!($t), &Value::Int(i))),
                    other => Err(ValueTypeError::new("integer", &other)),
                }
            }
        }

        impl IntoValue for $t {
            /// Integers beyond the `i64` range widen to a float
            #[allow(clippy::cast_precision_loss)]
            fn into_value(self) -> Value {
                i64::try_from(self).map_or_else(|_| Value::Float(self as f64), Value::Int)
            }
        }
    )*};
}

integer_value!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match unwrap_primitive(value) {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(ValueTypeError::new("number", &other)),
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match unwrap_primitive(value) {
            Value::Bool(b) => Ok(b),
            other => Err(ValueTypeError::new("boolean", &other)),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::List(items) | Value::Set(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueTypeError::new("list", &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue + Eq + Hash> FromValue for HashSet<T> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::List(items) | Value::Set(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueTypeError::new("set", &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for HashSet<T> {
    fn into_value(self) -> Value {
        Value::Set(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Map(m) => m
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(ValueTypeError::new("dict", &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        BTreeMap::<String, T>::from_value(value).map(|m| m.into_iter().collect())
    }
}

impl<T: IntoValue> IntoValue for HashMap<String, T> {
    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

impl FromValue for Instance {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Object(inst) => Ok(inst),
            other => Err(ValueTypeError::new("model instance", &other)),
        }
    }
}

impl IntoValue for Instance {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl FromValue for PrimitiveValue {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Primitive(p) => Ok(p),
            other => Err(ValueTypeError::new("primitive wrapper value", &other)),
        }
    }
}

impl IntoValue for PrimitiveValue {
    fn into_value(self) -> Value {
        Value::Primitive(self)
    }
}

impl FromValue for Arc<HostResponse> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Response(r) => Ok(r),
            other => Err(ValueTypeError::new("response", &other)),
        }
    }
}

impl IntoValue for Arc<HostResponse> {
    fn into_value(self) -> Value {
        Value::Response(self)
    }
}

impl IntoValue for HostResponse {
    fn into_value(self) -> Value {
        Value::Response(Arc::new(self))
    }
}

impl FromValue for JsonValue {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        Ok(value.to_json())
    }
}

impl IntoValue for JsonValue {
    fn into_value(self) -> Value {
        Value::from_json(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DefaultFactory, FieldDef, FieldDefault, PrimitiveType};
    use serde_json::json;

    fn tag_class() -> Arc<ModelClass> {
        ModelClass::domain("Tag").field("label", TypeRef::string()).build()
    }

    #[test]
    fn test_domain_instance_validates_nested_maps() {
        let tag = tag_class();
        let pet = ModelClass::domain("Pet")
            .field("name", TypeRef::string())
            .field("tags", TypeRef::list(TypeRef::model(&tag)))
            .build();
        let inst = Instance::from_json(&pet, &json!({"name": "Rex", "tags": [{"label": "good"}]}))
            .unwrap();
        let Some(Value::List(tags)) = inst.get("tags") else {
            panic!("tags missing");
        };
        assert!(matches!(&tags[0], Value::Object(t) if t.class().id() == tag.id()));
        assert_eq!(inst.to_json(), json!({"name": "Rex", "tags": [{"label": "good"}]}));
    }

    #[test]
    fn test_domain_rejects_extra_and_reports_locations() {
        let tag = tag_class();
        let pet = ModelClass::domain("Pet")
            .field("tags", TypeRef::list(TypeRef::model(&tag)))
            .build();
        let err = Instance::from_json(&pet, &json!({"tags": [{"label": 3}], "color": "red"}))
            .unwrap_err();
        let locs: Vec<String> = err.issues.iter().map(|i| i.loc.join(".")).collect();
        assert_eq!(locs, vec!["tags.0.label", "color"]);
    }

    #[test]
    fn test_host_ignores_extra_and_record_skips_validation() {
        let host = ModelClass::host("PetModel").field("age", TypeRef::integer()).build();
        let inst = Instance::from_json(&host, &json!({"age": 3, "extra": true})).unwrap();
        assert!(inst.get("extra").is_none());

        let record = ModelClass::record("PetRecord").field("age", TypeRef::integer()).build();
        let inst = Instance::from_json(&record, &json!({"age": "not a number"})).unwrap();
        assert_eq!(inst.get("age"), Some(&Value::Str("not a number".into())));
    }

    #[test]
    fn test_optional_without_default_is_required() {
        let class = ModelClass::domain("Note")
            .field("body", TypeRef::optional(TypeRef::string()))
            .build();
        assert!(Instance::new(&class, BTreeMap::new()).is_err());
        let mut values = BTreeMap::new();
        values.insert("body".to_string(), Value::Null);
        assert!(Instance::new(&class, values).is_ok());
    }

    #[test]
    fn test_factory_defaults_are_not_shared() {
        let class = ModelClass::domain("Bag")
            .field_def(FieldDef {
                name: "items".to_string(),
                ty: TypeRef::list(TypeRef::integer()),
                default: FieldDefault::Factory(DefaultFactory::cloning(Value::List(Vec::new()))),
                description: None,
            })
            .build();
        let mut a = Instance::new(&class, BTreeMap::new()).unwrap();
        let b = Instance::new(&class, BTreeMap::new()).unwrap();
        if let Some(Value::List(items)) = a.get_mut("items") {
            items.push(Value::Int(1));
        }
        assert_eq!(b.get("items"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_into_plain_unwraps_everything() {
        let id = PrimitiveType::new("UserId", ScalarKind::Integer).build();
        let user = ModelClass::domain("User").field("id", TypeRef::primitive(&id)).build();
        let inst = Instance::from_json(&user, &json!({"id": 5})).unwrap();
        let mut expected = BTreeMap::new();
        expected.insert("id".to_string(), Value::Int(5));
        assert_eq!(Value::Object(inst).into_plain(), Value::Map(expected));
    }

    #[test]
    fn test_from_value_roundtrip_for_rust_types() {
        let v = vec![Some(1_i64), None].into_value();
        assert_eq!(Vec::<Option<i64>>::from_value(v).unwrap(), vec![Some(1), None]);
        let err = String::from_value(Value::Int(1)).unwrap_err();
        assert_eq!(err.expected, "string");
    }

    #[test]
    fn test_unsigned_beyond_i64_widens_to_float() {
        assert_eq!(7_u64.into_value(), Value::Int(7));
        assert_eq!(u64::MAX.into_value(), Value::Float(u64::MAX as f64));
        let edge = (i64::MAX as u64) + 1;
        assert!(matches!(edge.into_value(), Value::Float(f) if f > 0.0));
    }
}
