use super::types::{FunctionDef, ParameterDescriptor, ParameterKind, SignatureDescriptor};
use crate::error::AnalysisError;
use crate::types::{ClassId, ModelClass, ModelKind, TypeRef, TypeRegistry};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Classifies a handler's parameters and return type.
#[derive(Debug, Clone, Copy)]
pub struct SignatureAnalyzer<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> SignatureAnalyzer<'a> {
    #[must_use]
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Build the [`SignatureDescriptor`] of `def`.
    ///
    /// A leading receiver parameter is skipped. Forward references are
    /// resolved against the registry; one that cannot be resolved, here or in
    /// a field of any class reachable from the signature, fails the analysis.
    pub fn analyze(&self, def: &FunctionDef) -> Result<SignatureDescriptor, AnalysisError> {
        let declared = match def.params.first() {
            Some(first) if first.receiver => &def.params[1..],
            _ => &def.params[..],
        };

        let mut parameters = Vec::with_capacity(declared.len());
        for decl in declared {
            let ty = self.resolve(def, &decl.name, &decl.ty)?;
            parameters.push(classify(&decl.name, ty, decl.default.clone()));
        }

        let return_type = match &def.returns {
            Some(ty) => Some(self.resolve(def, "return", ty)?),
            None => None,
        };
        let return_needs_conversion = return_type
            .as_ref()
            .is_some_and(TypeRef::contains_domain_types);

        let has_body_params = parameters.iter().any(ParameterDescriptor::is_type_safe);
        let has_non_body = parameters.iter().any(|p| !p.is_type_safe());

        debug!(
            function = %def.name,
            params = parameters.len(),
            has_body_params,
            return_needs_conversion,
            "Analyzed handler signature"
        );

        Ok(SignatureDescriptor {
            function_name: def.name.clone(),
            parameters,
            return_type,
            return_converted_type: None,
            return_needs_conversion,
            has_body_params,
            has_path_params: has_non_body,
            has_query_params: has_non_body,
            primitive_conversions: BTreeMap::new(),
            type_safe_conversions: BTreeMap::new(),
        })
    }

    fn resolve(&self, def: &FunctionDef, location: &str, ty: &TypeRef) -> Result<TypeRef, AnalysisError> {
        let resolved = self
            .registry
            .resolve(ty)
            .map_err(|name| AnalysisError::UnresolvedType {
                function: def.name.clone(),
                location: location.to_string(),
                name,
            })?;
        check_classes(&def.name, &resolved, &mut HashSet::new())?;
        Ok(resolved)
    }
}

/// Walk every class reachable from `ty`, failing on a field that is still a forward reference
fn check_classes(function: &str, ty: &TypeRef, seen: &mut HashSet<ClassId>) -> Result<(), AnalysisError> {
    match ty {
        TypeRef::Model(class) => {
            if !seen.insert(class.id()) {
                return Ok(());
            }
            for field in &class.fields {
                if let Some(name) = field.ty.first_unresolved() {
                    return Err(AnalysisError::UnresolvedField {
                        function: function.to_string(),
                        class: class.name.clone(),
                        field: field.name.clone(),
                        name: name.to_string(),
                    });
                }
                check_classes(function, &field.ty, seen)?;
            }
            Ok(())
        }
        TypeRef::List(t) | TypeRef::Set(t) | TypeRef::Map(t) | TypeRef::Optional(t) => {
            check_classes(function, t, seen)
        }
        TypeRef::Union(ts) => ts.iter().try_for_each(|t| check_classes(function, t, seen)),
        _ => Ok(()),
    }
}

fn classify(name: &str, ty: TypeRef, default_value: Option<crate::value::Value>) -> ParameterDescriptor {
    let (inner, optional) = ty.strip_optional();
    let (kind, converted_type, nested) = match inner {
        TypeRef::Primitive(p) => {
            let base = TypeRef::Scalar(p.base);
            let converted = if optional { TypeRef::optional(base) } else { base };
            (ParameterKind::Primitive { base: p.base }, Some(converted), BTreeMap::new())
        }
        TypeRef::Model(c) if c.kind == ModelKind::Domain => {
            (ParameterKind::TypeSafe, None, nested_primitive_fields(c))
        }
        // list/set/dict of domain objects travel in the body as well
        other if other.contains_model_of(ModelKind::Domain) => (ParameterKind::TypeSafe, None, BTreeMap::new()),
        _ => (ParameterKind::PassThrough, None, BTreeMap::new()),
    };

    ParameterDescriptor {
        name: name.to_string(),
        param_type: ty,
        converted_type,
        requires_conversion: kind != ParameterKind::PassThrough,
        kind,
        default_value,
        nested_primitive_fields: nested,
    }
}

fn nested_primitive_fields(class: &Arc<ModelClass>) -> BTreeMap<String, Arc<crate::types::PrimitiveType>> {
    class
        .fields
        .iter()
        .filter_map(|f| f.ty.as_primitive().map(|p| (f.name.clone(), Arc::clone(p))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ParamDecl;
    use crate::types::{PrimitiveType, ScalarKind};
    use crate::value::Value;

    fn noop(name: &str) -> FunctionDef {
        FunctionDef::new(name, |_| Ok(Value::Null))
    }

    #[test]
    fn test_classification() {
        let user_id = PrimitiveType::new("UserId", ScalarKind::Integer).minimum(1.0).build();
        let email = PrimitiveType::new("Email", ScalarKind::String).build();
        let user = ModelClass::domain("User")
            .field("id", TypeRef::primitive(&user_id))
            .field("email", TypeRef::optional(TypeRef::primitive(&email)))
            .field("name", TypeRef::string())
            .build();

        let mut registry = TypeRegistry::new();
        registry.register_model(&user).register_primitive(&user_id);

        let def = noop("update_user")
            .param_decl(ParamDecl::receiver("self"))
            .param("user_id", TypeRef::named("UserId"))
            .param("payload", TypeRef::named("User"))
            .param_with_default("verbose", TypeRef::boolean(), Value::Bool(false))
            .returns(TypeRef::named("User"));

        let sig = SignatureAnalyzer::new(&registry).analyze(&def).unwrap();
        assert_eq!(sig.parameters.len(), 3);

        let id = sig.find_parameter("user_id").unwrap();
        assert!(id.is_primitive() && !id.is_type_safe());
        assert_eq!(id.primitive_base(), Some(ScalarKind::Integer));
        assert_eq!(id.converted_type, Some(TypeRef::integer()));

        let payload = sig.find_parameter("payload").unwrap();
        assert!(payload.is_type_safe());
        let nested: Vec<&str> = payload.nested_primitive_fields.keys().map(String::as_str).collect();
        assert_eq!(nested, vec!["email", "id"]);

        let verbose = sig.find_parameter("verbose").unwrap();
        assert!(!verbose.requires_conversion && verbose.has_default());

        assert!(sig.has_body_params && sig.has_query_params && sig.has_path_params);
        assert!(sig.return_needs_conversion);
    }

    #[test]
    fn test_optional_primitive_keeps_nullability() {
        let slug = PrimitiveType::new("Slug", ScalarKind::String).build();
        let registry = TypeRegistry::new();
        let def = noop("find").param("slug", TypeRef::optional(TypeRef::primitive(&slug)));
        let sig = SignatureAnalyzer::new(&registry).analyze(&def).unwrap();
        let p = &sig.parameters[0];
        assert!(p.is_primitive());
        assert_eq!(p.converted_type, Some(TypeRef::optional(TypeRef::string())));
        assert!(!sig.has_body_params);
    }

    #[test]
    fn test_unresolved_parameter_type() {
        let registry = TypeRegistry::new();
        let def = noop("ghost").param("thing", TypeRef::list(TypeRef::named("Phantom")));
        let err = SignatureAnalyzer::new(&registry).analyze(&def).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnresolvedType {
                function: "ghost".into(),
                location: "thing".into(),
                name: "Phantom".into(),
            }
        );
    }

    #[test]
    fn test_unresolved_field_inside_class() {
        let registry = TypeRegistry::new();
        let outer = ModelClass::domain("Outer").field("inner", TypeRef::named("Inner")).build();
        let def = noop("nested").returns(TypeRef::model(&outer));
        let err = SignatureAnalyzer::new(&registry).analyze(&def).unwrap_err();
        assert!(matches!(err, AnalysisError::UnresolvedField { ref field, .. } if field == "inner"));
    }

    #[test]
    fn test_response_return_needs_no_conversion() {
        let registry = TypeRegistry::new();
        let def = noop("raw").returns(TypeRef::named("HostResponse"));
        let sig = SignatureAnalyzer::new(&registry).analyze(&def).unwrap();
        assert!(sig.returns_response());
        assert!(!sig.return_needs_conversion);
        assert!(!sig.has_path_params && !sig.has_query_params);
    }

    #[test]
    fn test_container_of_objects_is_type_safe() {
        let registry = TypeRegistry::new();
        let tag = ModelClass::domain("Tag").field("label", TypeRef::string()).build();
        let def = noop("tag_all")
            .param("tags", TypeRef::set(TypeRef::model(&tag)))
            .param("labels", TypeRef::list(TypeRef::string()));
        let sig = SignatureAnalyzer::new(&registry).analyze(&def).unwrap();

        let tags = sig.find_parameter("tags").unwrap();
        assert!(tags.is_type_safe() && tags.requires_conversion);
        assert!(tags.nested_primitive_fields.is_empty());
        assert!(!sig.find_parameter("labels").unwrap().requires_conversion);
        assert!(sig.has_body_params);
        assert_eq!(sig.non_body_parameter_names().collect::<Vec<_>>(), vec!["labels"]);
    }
}

