use crate::bridge::Direction;
use crate::error::{AggregatedValidationError, HandlerError, ValidationIssue};
use crate::signature::{FunctionDef, HandlerFn, SignatureConverter, SignatureDescriptor};
use crate::types::{ModelKind, TypeRef};
use crate::value::{CallArgs, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which wrapper strategy an [`Endpoint`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    /// The original handler, unwrapped
    Original,
    /// Original execution, rewritten metadata only
    Passthrough,
    /// Converts every argument; failures become one client error
    Body,
    /// Converts every argument; failures are collected into one validation error
    Query,
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WrapperKind::Original => "original",
            WrapperKind::Passthrough => "passthrough",
            WrapperKind::Body => "body",
            WrapperKind::Query => "query",
        };
        write!(f, "{s}")
    }
}

/// A parameter as the host framework sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalParam {
    pub name: String,
    pub annotation: TypeRef,
    pub default: Option<Value>,
}

impl ExternalParam {
    /// Whether the host should read this parameter from the request body
    #[must_use]
    pub fn is_body(&self) -> bool {
        self.annotation.contains_model_of(ModelKind::Host)
    }
}

/// A callable plus the host-facing signature metadata.
#[derive(Clone)]
pub struct Endpoint {
    pub kind: WrapperKind,
    pub name: String,
    /// Host-facing parameter list
    pub params: Vec<ExternalParam>,
    /// Host-facing annotations: parameter names plus `"return"`
    pub annotations: BTreeMap<String, TypeRef>,
    /// Declared types of converted parameters
    pub original_param_types: Option<BTreeMap<String, TypeRef>>,
    /// Declared return type, when it was rewritten or passed through
    pub original_return_type: Option<TypeRef>,
    pub signature: Arc<SignatureDescriptor>,
    handler: HandlerFn,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

impl Endpoint {
    pub fn call(&self, args: CallArgs) -> Result<Value, HandlerError> {
        (self.handler)(args)
    }

    /// The callable; for [`WrapperKind::Original`] and
    /// [`WrapperKind::Passthrough`] this is the handler's own `Arc`
    #[must_use]
    pub fn handler(&self) -> &HandlerFn {
        &self.handler
    }

    #[must_use]
    pub fn return_annotation(&self) -> Option<&TypeRef> {
        self.annotations.get("return")
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ExternalParam> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// Builds an [`Endpoint`] for one handler.
pub struct RouteWrapper<'a> {
    def: &'a FunctionDef,
    sig: &'a SignatureDescriptor,
    converter: Arc<SignatureConverter>,
    path_params: HashSet<String>,
}

impl<'a> RouteWrapper<'a> {
    pub fn new(def: &'a FunctionDef, sig: &'a SignatureDescriptor, converter: Arc<SignatureConverter>) -> Self {
        Self {
            def,
            sig,
            converter,
            path_params: HashSet::new(),
        }
    }

    /// Route path; its placeholders report failures under `path` instead of `query`
    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path_params = placeholder_names(path).map(str::to_string).collect();
        self
    }

    /// Pick the wrapper strategy
    #[must_use]
    pub fn kind(&self) -> WrapperKind {
        let returns_response = self.sig.returns_response();
        let needs_params = self.sig.needs_parameter_conversion();
        if !needs_params && !self.sig.return_needs_conversion && !returns_response {
            WrapperKind::Original
        } else if returns_response && !needs_params {
            WrapperKind::Passthrough
        } else if self.sig.has_body_params {
            WrapperKind::Body
        } else {
            WrapperKind::Query
        }
    }

    #[must_use]
    pub fn build(self) -> Endpoint {
        let kind = self.kind();
        let sig = Arc::new(self.sig.clone());
        debug!(function = %self.def.name, wrapper = %kind, "Selected wrapper");

        let rewrite = kind != WrapperKind::Original;
        let params = self.external_params(rewrite);
        let mut annotations: BTreeMap<String, TypeRef> = params
            .iter()
            .map(|p| (p.name.clone(), p.annotation.clone()))
            .collect();
        let return_annotation = if rewrite {
            sig.return_converted_type.clone().or_else(|| sig.return_type.clone())
        } else {
            sig.return_type.clone()
        };
        if let Some(ret) = return_annotation {
            annotations.insert("return".to_string(), ret);
        }

        let original_param_types = if rewrite && sig.needs_parameter_conversion() {
            Some(
                sig.parameters
                    .iter()
                    .filter(|p| p.requires_conversion)
                    .map(|p| (p.name.clone(), p.param_type.clone()))
                    .collect(),
            )
        } else {
            None
        };
        let original_return_type = match kind {
            WrapperKind::Original => None,
            WrapperKind::Passthrough => sig.return_type.clone(),
            WrapperKind::Body | WrapperKind::Query => {
                sig.return_type.clone().filter(|_| sig.return_needs_conversion)
            }
        };

        let handler: HandlerFn = match kind {
            WrapperKind::Original | WrapperKind::Passthrough => Arc::clone(&self.def.handler),
            WrapperKind::Body => body_wrapper(
                Arc::clone(&self.def.handler),
                Arc::clone(&sig),
                Arc::clone(&self.converter),
            ),
            WrapperKind::Query => query_wrapper(
                Arc::clone(&self.def.handler),
                Arc::clone(&sig),
                Arc::clone(&self.converter),
                Arc::new(self.path_params),
            ),
        };

        Endpoint {
            kind,
            name: self.def.name.clone(),
            params,
            annotations,
            original_param_types,
            original_return_type,
            signature: sig,
            handler,
        }
    }

    fn external_params(&self, rewrite: bool) -> Vec<ExternalParam> {
        self.sig
            .parameters
            .iter()
            .map(|p| {
                let annotation = match (&p.converted_type, rewrite) {
                    (Some(converted), true) => converted.clone(),
                    _ => p.param_type.clone(),
                };
                let default = match (&p.default_value, rewrite && p.requires_conversion) {
                    (Some(d), true) => Some(self.host_default(d.clone())),
                    (d, _) => d.clone(),
                };
                ExternalParam {
                    name: p.name.clone(),
                    annotation,
                    default,
                }
            })
            .collect()
    }

    /// Default in host terms: primitive values unwrapped, domain instances
    /// (also inside containers) converted
    fn host_default(&self, default: Value) -> Value {
        match default {
            Value::Primitive(p) => p.into_base(),
            v @ (Value::Object(_) | Value::List(_) | Value::Set(_) | Value::Map(_)) => self
                .converter
                .bridge()
                .convert_value(v.clone(), Direction::DomainToHost)
                .unwrap_or(v),
            other => other,
        }
    }
}

/// Wrap `def` according to its enriched signature
#[must_use]
pub fn create_wrapper(def: &FunctionDef, sig: &SignatureDescriptor, converter: Arc<SignatureConverter>) -> Endpoint {
    RouteWrapper::new(def, sig, converter).build()
}

/// `{name}` and `{name:path}` placeholder names of a route path
pub(crate) fn placeholder_names(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter_map(|segment| {
        let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
        Some(inner.split(':').next().unwrap_or(inner))
    })
}

/// Run the handler, turning a panic into a handler failure
fn invoke(handler: &HandlerFn, args: CallArgs) -> Result<Value, HandlerError> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(args))) {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "handler panicked".to_string());
            Err(HandlerError::Failed {
                type_name: "Panic".to_string(),
                message,
            })
        }
    }
}

/// Convert a non-host failure at the wrapper boundary
fn at_boundary(function: &str, err: HandlerError) -> HandlerError {
    if let HandlerError::Failed { type_name, message } = &err {
        warn!(
            function = %function,
            error_type = %type_name,
            message = %message,
            "Handler failure converted to client error"
        );
    }
    err.into_client_error()
}

fn body_wrapper(handler: HandlerFn, sig: Arc<SignatureDescriptor>, converter: Arc<SignatureConverter>) -> HandlerFn {
    Arc::new(move |args: CallArgs| -> Result<Value, HandlerError> {
        let mut keyword = BTreeMap::new();
        for (name, raw) in args.keyword {
            let value = converter
                .convert_parameter_value(&name, raw, &sig)
                .map_err(|e| at_boundary(&sig.function_name, e.into()))?;
            keyword.insert(name, value);
        }
        let converted = CallArgs {
            positional: args.positional,
            keyword,
        };
        let result = invoke(&handler, converted).map_err(|e| at_boundary(&sig.function_name, e))?;
        Ok(converter.convert_return_value(result, &sig))
    })
}

fn query_wrapper(
    handler: HandlerFn,
    sig: Arc<SignatureDescriptor>,
    converter: Arc<SignatureConverter>,
    path_params: Arc<HashSet<String>>,
) -> HandlerFn {
    Arc::new(move |args: CallArgs| -> Result<Value, HandlerError> {
        let mut keyword = BTreeMap::new();
        let mut errors = Vec::new();
        for (name, raw) in args.keyword {
            match converter.convert_parameter_value(&name, raw, &sig) {
                Ok(value) => {
                    keyword.insert(name, value);
                }
                Err(e) => {
                    let location = if path_params.contains(&name) { "path" } else { "query" };
                    errors.push(ValidationIssue::new(
                        vec![location.to_string(), name],
                        e.message,
                        e.input,
                    ));
                }
            }
        }
        if !errors.is_empty() {
            debug!(
                function = %sig.function_name,
                failures = errors.len(),
                "Query parameter validation failed"
            );
            return Err(AggregatedValidationError { errors }.into());
        }

        let converted = CallArgs {
            positional: args.positional,
            keyword,
        };
        let result = invoke(&handler, converted).map_err(|e| at_boundary(&sig.function_name, e))?;
        Ok(converter.convert_return_value(result, &sig))
    })
}
