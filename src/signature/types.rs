use crate::error::HandlerError;
use crate::types::{ModelClass, PrimitiveType, ScalarKind, TypeRef};
use crate::value::{CallArgs, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A callable handler body.
pub type HandlerFn = Arc<dyn Fn(CallArgs) -> Result<Value, HandlerError> + Send + Sync>;

/// One declared parameter of a [`FunctionDef`].
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
    pub default: Option<Value>,
    /// Instance receiver (`self`); skipped by analysis
    pub receiver: bool,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            receiver: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// A leading receiver parameter
    pub fn receiver(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeRef::any(),
            default: None,
            receiver: true,
        }
    }
}

/// A handler function: its declared signature plus the callable.
#[derive(Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<ParamDecl>,
    /// Declared return type; `None` when undeclared
    pub returns: Option<TypeRef>,
    pub description: Option<String>,
    pub handler: HandlerFn,
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

impl FunctionDef {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CallArgs) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
            description: None,
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(ParamDecl::new(name, ty));
        self
    }

    #[must_use]
    pub fn param_with_default(mut self, name: impl Into<String>, ty: TypeRef, default: Value) -> Self {
        self.params.push(ParamDecl::new(name, ty).with_default(default));
        self
    }

    #[must_use]
    pub fn param_decl(mut self, decl: ParamDecl) -> Self {
        self.params.push(decl);
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns = Some(ty);
        self
    }

    #[must_use]
    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }

    /// Invoke the handler directly
    pub fn call(&self, args: CallArgs) -> Result<Value, HandlerError> {
        (self.handler)(args)
    }
}

/// How a parameter is treated at the wrapper boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Strict primitive wrapper over `base`
    Primitive { base: ScalarKind },
    /// Domain object, routed to the request body
    TypeSafe,
    /// Passed through unchanged
    PassThrough,
}

/// Classification of one handler parameter.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    pub name: String,
    /// Declared (resolved) type
    pub param_type: TypeRef,
    /// Host-facing type, once known
    pub converted_type: Option<TypeRef>,
    pub kind: ParameterKind,
    pub requires_conversion: bool,
    pub default_value: Option<Value>,
    /// Primitive-wrapped fields of a domain-object parameter
    pub nested_primitive_fields: BTreeMap<String, Arc<PrimitiveType>>,
}

impl ParameterDescriptor {
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, ParameterKind::Primitive { .. })
    }

    #[must_use]
    pub fn is_type_safe(&self) -> bool {
        self.kind == ParameterKind::TypeSafe
    }

    #[must_use]
    pub fn primitive_base(&self) -> Option<ScalarKind> {
        match self.kind {
            ParameterKind::Primitive { base } => Some(base),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }
}

/// Analyzed (and, after enrichment, annotated) handler signature.
#[derive(Debug, Clone)]
pub struct SignatureDescriptor {
    pub function_name: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: Option<TypeRef>,
    /// Host-facing return type, filled by enrichment when a conversion is needed
    pub return_converted_type: Option<TypeRef>,
    pub return_needs_conversion: bool,
    pub has_body_params: bool,
    pub has_path_params: bool,
    pub has_query_params: bool,
    /// parameter → (wrapper type, base scalar)
    pub primitive_conversions: BTreeMap<String, (Arc<PrimitiveType>, ScalarKind)>,
    /// parameter → (domain class, generated host class)
    pub type_safe_conversions: BTreeMap<String, (Arc<ModelClass>, Arc<ModelClass>)>,
}

impl SignatureDescriptor {
    #[must_use]
    pub fn find_parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Whether any parameter value must be converted
    #[must_use]
    pub fn needs_parameter_conversion(&self) -> bool {
        !self.primitive_conversions.is_empty()
            || !self.type_safe_conversions.is_empty()
            || self.parameters.iter().any(|p| p.is_type_safe() && p.converted_type.is_some())
    }

    #[must_use]
    pub fn returns_response(&self) -> bool {
        self.return_type.as_ref().is_some_and(TypeRef::is_response)
    }

    /// Names of parameters that are not routed to the body
    pub fn non_body_parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| !p.is_type_safe())
            .map(|p| p.name.as_str())
    }
}
