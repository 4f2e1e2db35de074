use super::{ModelClass, PrimitiveType, ScalarKind, TypeRef};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Namespace that forward references ([`TypeRef::Named`]) resolve against.
///
/// Comes pre-populated with scalar names in both Rust and wire spellings.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeRef>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        let builtins: [(&str, TypeRef); 17] = [
            ("String", TypeRef::Scalar(ScalarKind::String)),
            ("str", TypeRef::Scalar(ScalarKind::String)),
            ("string", TypeRef::Scalar(ScalarKind::String)),
            ("i64", TypeRef::Scalar(ScalarKind::Integer)),
            ("i32", TypeRef::Scalar(ScalarKind::Integer)),
            ("u64", TypeRef::Scalar(ScalarKind::Integer)),
            ("u32", TypeRef::Scalar(ScalarKind::Integer)),
            ("int", TypeRef::Scalar(ScalarKind::Integer)),
            ("f64", TypeRef::Scalar(ScalarKind::Float)),
            ("f32", TypeRef::Scalar(ScalarKind::Float)),
            ("float", TypeRef::Scalar(ScalarKind::Float)),
            ("bool", TypeRef::Scalar(ScalarKind::Boolean)),
            ("Value", TypeRef::Scalar(ScalarKind::Any)),
            ("Any", TypeRef::Scalar(ScalarKind::Any)),
            ("dict", TypeRef::Map(Box::new(TypeRef::Scalar(ScalarKind::Any)))),
            ("HostResponse", TypeRef::Response),
            ("Response", TypeRef::Response),
        ];
        for (name, ty) in builtins {
            entries.insert(name.to_string(), ty);
        }
        Self { entries }
    }

    /// Register a class under its own name; a later registration replaces an earlier one
    pub fn register_model(&mut self, class: &Arc<ModelClass>) -> &mut Self {
        debug!(class = %class.name, kind = %class.kind, "Registered model class");
        self.entries
            .insert(class.name.clone(), TypeRef::Model(Arc::clone(class)));
        self
    }

    /// Register a primitive wrapper under its own name
    pub fn register_primitive(&mut self, ty: &Arc<PrimitiveType>) -> &mut Self {
        debug!(primitive = %ty.name, base = %ty.base, "Registered primitive wrapper");
        self.entries
            .insert(ty.name.clone(), TypeRef::Primitive(Arc::clone(ty)));
        self
    }

    /// Register an arbitrary alias
    pub fn register_alias(&mut self, name: impl Into<String>, ty: TypeRef) -> &mut Self {
        self.entries.insert(name.into(), ty);
        self
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeRef> {
        self.entries.get(name)
    }

    /// Replace every forward reference inside `ty`.
    ///
    /// Returns the first name that has no entry as the error. Classes are not
    /// descended into; their fields are declared with resolved types.
    pub fn resolve(&self, ty: &TypeRef) -> Result<TypeRef, String> {
        Ok(match ty {
            TypeRef::Named(name) => match self.entries.get(name) {
                Some(TypeRef::Named(_)) | None => return Err(name.clone()),
                Some(found) => found.clone(),
            },
            TypeRef::List(t) => TypeRef::List(Box::new(self.resolve(t)?)),
            TypeRef::Set(t) => TypeRef::Set(Box::new(self.resolve(t)?)),
            TypeRef::Map(t) => TypeRef::Map(Box::new(self.resolve(t)?)),
            TypeRef::Optional(t) => TypeRef::Optional(Box::new(self.resolve(t)?)),
            TypeRef::Union(ts) => TypeRef::Union(
                ts.iter()
                    .map(|t| self.resolve(t))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            other => other.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_registered_and_builtin_names() {
        let mut reg = TypeRegistry::new();
        let pet = ModelClass::domain("Pet").field("name", TypeRef::string()).build();
        reg.register_model(&pet);

        let resolved = reg
            .resolve(&TypeRef::list(TypeRef::named("Pet")))
            .unwrap();
        assert_eq!(resolved, TypeRef::list(TypeRef::model(&pet)));
        assert_eq!(reg.resolve(&TypeRef::named("i64")).unwrap(), TypeRef::integer());
    }

    #[test]
    fn test_unknown_name_is_reported() {
        let reg = TypeRegistry::new();
        let err = reg
            .resolve(&TypeRef::optional(TypeRef::named("Ghost")))
            .unwrap_err();
        assert_eq!(err, "Ghost");
    }

    #[test]
    fn test_alias_resolves_to_its_type() {
        let mut reg = TypeRegistry::new();
        let tag = ModelClass::domain("Tag").field("label", TypeRef::string()).build();
        reg.register_alias("TagList", TypeRef::list(TypeRef::model(&tag)));

        let resolved = reg.resolve(&TypeRef::optional(TypeRef::named("TagList"))).unwrap();
        assert_eq!(resolved, TypeRef::optional(TypeRef::list(TypeRef::model(&tag))));
    }
}
