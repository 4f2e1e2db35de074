use super::{ModelClass, ModelKind, PrimitiveType, ScalarKind};
use std::fmt;
use std::sync::Arc;

/// A declared type: parameter and return annotations, and model field types.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Scalar(ScalarKind),
    Primitive(Arc<PrimitiveType>),
    Model(Arc<ModelClass>),
    List(Box<TypeRef>),
    /// Unique-element collection
    Set(Box<TypeRef>),
    /// String-keyed dictionary of the inner type
    Map(Box<TypeRef>),
    Optional(Box<TypeRef>),
    Union(Vec<TypeRef>),
    /// The host framework's pre-built response envelope
    Response,
    /// Forward reference resolved later against a [`super::TypeRegistry`]
    Named(String),
}

impl TypeRef {
    #[must_use]
    pub fn string() -> Self {
        TypeRef::Scalar(ScalarKind::String)
    }

    #[must_use]
    pub fn integer() -> Self {
        TypeRef::Scalar(ScalarKind::Integer)
    }

    #[must_use]
    pub fn float() -> Self {
        TypeRef::Scalar(ScalarKind::Float)
    }

    #[must_use]
    pub fn boolean() -> Self {
        TypeRef::Scalar(ScalarKind::Boolean)
    }

    #[must_use]
    pub fn any() -> Self {
        TypeRef::Scalar(ScalarKind::Any)
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    #[must_use]
    pub fn model(class: &Arc<ModelClass>) -> Self {
        TypeRef::Model(Arc::clone(class))
    }

    #[must_use]
    pub fn primitive(ty: &Arc<PrimitiveType>) -> Self {
        TypeRef::Primitive(Arc::clone(ty))
    }

    #[must_use]
    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    #[must_use]
    pub fn set(inner: TypeRef) -> Self {
        TypeRef::Set(Box::new(inner))
    }

    #[must_use]
    pub fn map(inner: TypeRef) -> Self {
        TypeRef::Map(Box::new(inner))
    }

    #[must_use]
    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional(Box::new(inner))
    }

    /// Peel one `Optional` layer, reporting whether there was one
    #[must_use]
    pub fn strip_optional(&self) -> (&TypeRef, bool) {
        match self {
            TypeRef::Optional(inner) => (inner, true),
            other => (other, false),
        }
    }

    /// The class when this is a model of the given kind, looking through `Optional`
    #[must_use]
    pub fn as_model_of(&self, kind: ModelKind) -> Option<&Arc<ModelClass>> {
        match self.strip_optional().0 {
            TypeRef::Model(c) if c.kind == kind => Some(c),
            _ => None,
        }
    }

    /// The primitive wrapper, looking through `Optional`
    #[must_use]
    pub fn as_primitive(&self) -> Option<&Arc<PrimitiveType>> {
        match self.strip_optional().0 {
            TypeRef::Primitive(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(self.strip_optional().0, TypeRef::Response)
    }

    /// Whether a domain class or primitive wrapper occurs anywhere inside
    #[must_use]
    pub fn contains_domain_types(&self) -> bool {
        match self {
            TypeRef::Primitive(_) => true,
            TypeRef::Model(c) => c.kind == ModelKind::Domain,
            TypeRef::List(t) | TypeRef::Set(t) | TypeRef::Map(t) | TypeRef::Optional(t) => {
                t.contains_domain_types()
            }
            TypeRef::Union(ts) => ts.iter().any(TypeRef::contains_domain_types),
            TypeRef::Scalar(_) | TypeRef::Response | TypeRef::Named(_) => false,
        }
    }

    /// Whether a class of `kind` appears anywhere in this type, not descending into classes
    #[must_use]
    pub fn contains_model_of(&self, kind: ModelKind) -> bool {
        match self {
            TypeRef::Model(c) => c.kind == kind,
            TypeRef::List(t) | TypeRef::Set(t) | TypeRef::Map(t) | TypeRef::Optional(t) => {
                t.contains_model_of(kind)
            }
            TypeRef::Union(ts) => ts.iter().any(|t| t.contains_model_of(kind)),
            _ => false,
        }
    }

    /// First forward reference left in this type, not descending into classes
    #[must_use]
    pub fn first_unresolved(&self) -> Option<&str> {
        match self {
            TypeRef::Named(n) => Some(n),
            TypeRef::List(t) | TypeRef::Set(t) | TypeRef::Map(t) | TypeRef::Optional(t) => {
                t.first_unresolved()
            }
            TypeRef::Union(ts) => ts.iter().find_map(TypeRef::first_unresolved),
            _ => None,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Scalar(a), TypeRef::Scalar(b)) => a == b,
            (TypeRef::Primitive(a), TypeRef::Primitive(b)) => a.same_rules(b),
            (TypeRef::Model(a), TypeRef::Model(b)) => a.id() == b.id(),
            (TypeRef::List(a), TypeRef::List(b))
            | (TypeRef::Set(a), TypeRef::Set(b))
            | (TypeRef::Map(a), TypeRef::Map(b))
            | (TypeRef::Optional(a), TypeRef::Optional(b)) => a == b,
            (TypeRef::Union(a), TypeRef::Union(b)) => a == b,
            (TypeRef::Response, TypeRef::Response) => true,
            (TypeRef::Named(a), TypeRef::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(s) => write!(f, "{s}"),
            TypeRef::Primitive(p) => write!(f, "{}", p.name),
            TypeRef::Model(c) => write!(f, "{}", c.name),
            TypeRef::List(t) => write!(f, "list[{t}]"),
            TypeRef::Set(t) => write!(f, "set[{t}]"),
            TypeRef::Map(t) => write!(f, "dict[str, {t}]"),
            TypeRef::Optional(t) => write!(f, "Optional[{t}]"),
            TypeRef::Union(ts) => {
                let members: Vec<String> = ts.iter().map(ToString::to_string).collect();
                write!(f, "Union[{}]", members.join(", "))
            }
            TypeRef::Response => write!(f, "Response"),
            TypeRef::Named(n) => write!(f, "'{n}'"),
        }
    }
}
