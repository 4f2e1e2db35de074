use super::TypeRef;
use crate::value::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`ModelClass`].
///
/// Conversion caches key on this, never on class names: two classes with the
/// same name and shape are still different classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of the three object representations a class belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Strict, self-validating domain object
    Domain,
    /// The host framework's validated model
    Host,
    /// Unvalidated attribute container
    Record,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Domain => write!(f, "domain"),
            ModelKind::Host => write!(f, "host model"),
            ModelKind::Record => write!(f, "record"),
        }
    }
}

/// Produces a fresh default value for every new instance.
#[derive(Clone)]
pub struct DefaultFactory(Arc<dyn Fn() -> Value + Send + Sync>);

impl DefaultFactory {
    pub fn new(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        DefaultFactory(Arc::new(f))
    }

    /// Factory returning a copy of `template` on each call
    #[must_use]
    pub fn cloning(template: Value) -> Self {
        DefaultFactory::new(move || template.clone())
    }

    #[must_use]
    pub fn produce(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for DefaultFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultFactory(..)")
    }
}

/// Default of a declared field.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// No default; the field must be supplied
    Required,
    /// A literal default
    Value(Value),
    /// A per-instance default
    Factory(DefaultFactory),
}

impl FieldDefault {
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self, FieldDefault::Required)
    }

    /// Materialize the default for a new instance
    #[must_use]
    pub fn produce(&self) -> Option<Value> {
        match self {
            FieldDefault::Required => None,
            FieldDefault::Value(v) => Some(v.clone()),
            FieldDefault::Factory(f) => Some(f.produce()),
        }
    }
}

/// A declared field of a [`ModelClass`].
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub default: FieldDefault,
    pub description: Option<String>,
}

/// A runtime "class": named, ordered field declarations of one representation.
#[derive(Debug)]
pub struct ModelClass {
    id: ClassId,
    pub name: String,
    pub kind: ModelKind,
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
    /// Source class this one was synthesized from, if any
    pub generated_from: Option<ClassId>,
}

impl ModelClass {
    /// Start declaring a domain class
    pub fn domain(name: impl Into<String>) -> ModelClassBuilder {
        ModelClassBuilder::new(name, ModelKind::Domain)
    }

    /// Start declaring a host model class
    pub fn host(name: impl Into<String>) -> ModelClassBuilder {
        ModelClassBuilder::new(name, ModelKind::Host)
    }

    /// Start declaring a plain record class
    pub fn record(name: impl Into<String>) -> ModelClassBuilder {
        ModelClassBuilder::new(name, ModelKind::Record)
    }

    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Builder for [`ModelClass`]; every built class receives a fresh [`ClassId`].
#[derive(Debug)]
pub struct ModelClassBuilder {
    name: String,
    kind: ModelKind,
    description: Option<String>,
    fields: Vec<FieldDef>,
    generated_from: Option<ClassId>,
}

impl ModelClassBuilder {
    pub fn new(name: impl Into<String>, kind: ModelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            fields: Vec::new(),
            generated_from: None,
        }
    }

    #[must_use]
    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }

    /// Required field
    #[must_use]
    pub fn field(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.field_def(FieldDef {
            name: name.into(),
            ty,
            default: FieldDefault::Required,
            description: None,
        })
    }

    /// Field with a literal default
    #[must_use]
    pub fn field_with_default(self, name: impl Into<String>, ty: TypeRef, default: Value) -> Self {
        self.field_def(FieldDef {
            name: name.into(),
            ty,
            default: FieldDefault::Value(default),
            description: None,
        })
    }

    #[must_use]
    pub fn field_def(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    #[must_use]
    pub(crate) fn generated_from(mut self, source: ClassId) -> Self {
        self.generated_from = Some(source);
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<ModelClass> {
        Arc::new(ModelClass {
            id: ClassId::next(),
            name: self.name,
            kind: self.kind,
            description: self.description,
            fields: self.fields,
            generated_from: self.generated_from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarKind;

    #[test]
    fn test_each_build_gets_new_identity() {
        let a = ModelClass::domain("Pet").field("name", TypeRef::Scalar(ScalarKind::String)).build();
        let b = ModelClass::domain("Pet").field("name", TypeRef::Scalar(ScalarKind::String)).build();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_factory_default_produces_fresh_values() {
        let d = FieldDefault::Factory(DefaultFactory::cloning(Value::List(vec![Value::Int(1)])));
        let mut first = d.produce().unwrap();
        if let Value::List(items) = &mut first {
            items.push(Value::Int(2));
        }
        assert_eq!(d.produce().unwrap(), Value::List(vec![Value::Int(1)]));
    }
}
