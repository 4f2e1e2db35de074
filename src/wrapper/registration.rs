use super::core::{RouteWrapper, WrapperKind};
use crate::bridge::SchemaBridge;
use crate::error::{AnalysisError, ClassConversionTypeError, RegistrationError};
use crate::router::{parse_path, HostRouter, ANY_METHODS};
use crate::signature::{FunctionDef, SignatureAnalyzer, SignatureConverter, SignatureDescriptor};
use crate::types::TypeRegistry;
use http::Method;
use std::sync::Arc;
use tracing::info;

/// Summary of one installed route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub path: String,
    pub methods: Vec<Method>,
    pub kind: WrapperKind,
    pub function_name: String,
}

/// Analyze, enrich, wrap and install handlers into a [`HostRouter`].
///
/// ```rust
/// use routebridge::{RouteBridge, RouteTable, SchemaBridge};
/// use routebridge::config::BridgeConfig;
/// use routebridge::signature::FunctionDef;
/// use routebridge::types::TypeRef;
/// use routebridge::value::Value;
/// use std::sync::Arc;
///
/// let bridge = RouteBridge::with_bridge(Arc::new(SchemaBridge::new(BridgeConfig::default())));
/// let mut table = RouteTable::new();
/// let def = FunctionDef::new("v1__models_raw", |_| Ok(Value::Null))
///     .param("models", TypeRef::string());
///
/// let info = bridge.register_route_any(&mut table, &def, None).unwrap();
/// assert_eq!(info.path, "/v1/{models}/raw");
/// ```
#[derive(Debug)]
pub struct RouteBridge {
    registry: TypeRegistry,
    converter: Arc<SignatureConverter>,
}

impl Default for RouteBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteBridge {
    /// Registration façade over the process-wide schema bridge
    #[must_use]
    pub fn new() -> Self {
        Self::with_bridge(SchemaBridge::global())
    }

    #[must_use]
    pub fn with_bridge(bridge: Arc<SchemaBridge>) -> Self {
        Self {
            registry: TypeRegistry::new(),
            converter: Arc::new(SignatureConverter::new(bridge)),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Register domain classes and primitive wrappers here so forward references resolve
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn bridge(&self) -> &Arc<SchemaBridge> {
        self.converter.bridge()
    }

    #[must_use]
    pub fn converter(&self) -> &Arc<SignatureConverter> {
        &self.converter
    }

    pub fn analyze(&self, def: &FunctionDef) -> Result<SignatureDescriptor, AnalysisError> {
        SignatureAnalyzer::new(&self.registry).analyze(def)
    }

    pub fn enrich(&self, sig: SignatureDescriptor) -> Result<SignatureDescriptor, ClassConversionTypeError> {
        self.converter.enrich(sig)
    }

    /// Install `def` at `path` for `methods`
    pub fn register_route<R: HostRouter + ?Sized>(
        &self,
        router: &mut R,
        def: &FunctionDef,
        path: &str,
        methods: &[Method],
    ) -> Result<RouteInfo, RegistrationError> {
        let sig = self.enrich(self.analyze(def)?)?;
        let endpoint = RouteWrapper::new(def, &sig, Arc::clone(&self.converter))
            .with_path(path)
            .build();
        let kind = endpoint.kind;

        router.add_route(path, methods, Arc::new(endpoint))?;

        info!(
            function = %def.name,
            path = %path,
            methods = ?methods,
            wrapper = %kind,
            "Route registered"
        );
        Ok(RouteInfo {
            path: path.to_string(),
            methods: methods.to_vec(),
            kind,
            function_name: def.name.clone(),
        })
    }

    /// Install `def` for every standard method.
    ///
    /// An explicit `path` is used verbatim; otherwise it is derived from the
    /// function name and the names of its non-body parameters.
    pub fn register_route_any<R: HostRouter + ?Sized>(
        &self,
        router: &mut R,
        def: &FunctionDef,
        path: Option<&str>,
    ) -> Result<RouteInfo, RegistrationError> {
        let path = match path {
            Some(explicit) => explicit.to_string(),
            None => {
                let sig = self.analyze(def)?;
                let names: Vec<&str> = sig.non_body_parameter_names().collect();
                parse_path(&def.name, &names)
            }
        };
        self.register_route(router, def, &path, &ANY_METHODS)
    }
}
