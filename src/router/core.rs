//! Reference host router: regex route table plus argument binding.

use super::response::HostResponse;
use crate::error::{HandlerError, ValidationIssue};
use crate::types::{ModelKind, ScalarKind, TypeRef};
use crate::value::{CallArgs, Instance, Value};
use crate::wrapper::{Endpoint, ExternalParam};
use http::Method;
use regex::Regex;
use serde_json::Value as JsonValue;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Methods a route registered for "any" method accepts
pub const ANY_METHODS: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
    Method::HEAD,
    Method::TRACE,
];

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Path parameters of a match; names are shared with the route table
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A route path the router could not compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route path `{path}`: {message}")]
pub struct RouteError {
    pub path: String,
    pub message: String,
}

/// The host framework's route installation API.
pub trait HostRouter {
    /// Install `endpoint` at `path` for each of `methods`
    fn add_route(&mut self, path: &str, methods: &[Method], endpoint: Arc<Endpoint>) -> Result<(), RouteError>;
}

#[derive(Clone)]
struct Route {
    method: Method,
    path_pattern: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
    endpoint: Arc<Endpoint>,
}

/// Result of matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub endpoint: Arc<Endpoint>,
    pub path_pattern: String,
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Last occurrence wins when a name repeats
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal in-process host router.
///
/// Routes are matched in registration order. Registering the same method and
/// path twice replaces the earlier endpoint.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.route_summaries())
            .finish()
    }
}

impl HostRouter for RouteTable {
    fn add_route(&mut self, path: &str, methods: &[Method], endpoint: Arc<Endpoint>) -> Result<(), RouteError> {
        let (regex, param_names) = Self::path_to_regex(path).map_err(|e| RouteError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let param_names: Vec<Arc<str>> = param_names.into_iter().map(Arc::from).collect();

        for method in methods {
            let route = Route {
                method: method.clone(),
                path_pattern: path.to_string(),
                regex: regex.clone(),
                param_names: param_names.clone(),
                endpoint: Arc::clone(&endpoint),
            };
            match self
                .routes
                .iter_mut()
                .find(|r| r.method == *method && r.path_pattern == path)
            {
                Some(existing) => {
                    warn!(
                        method = %method,
                        path = %path,
                        old_handler = %existing.endpoint.name,
                        new_handler = %endpoint.name,
                        "Replacing existing route"
                    );
                    *existing = route;
                }
                None => self.routes.push(route),
            }
        }

        info!(
            path = %path,
            handler_name = %endpoint.name,
            methods = methods.len(),
            routes_count = self.routes.len(),
            "Route added"
        );
        Ok(())
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// `"METHOD /path -> handler"` for every installed route
    #[must_use]
    pub fn route_summaries(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| format!("{} {} -> {}", r.method, r.path_pattern, r.endpoint.name))
            .collect()
    }

    /// Match a request to a route
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        for route in self.routes.iter().filter(|r| r.method == *method) {
            let Some(caps) = route.regex.captures(path) else {
                continue;
            };
            let mut path_params = ParamVec::new();
            for (i, name) in route.param_names.iter().enumerate() {
                if let Some(m) = caps.get(i + 1) {
                    let value = urlencoding::decode(m.as_str())
                        .map_or_else(|_| m.as_str().to_string(), |v| v.into_owned());
                    path_params.push((Arc::clone(name), value));
                }
            }
            debug!(
                method = %method,
                path = %path,
                handler_name = %route.endpoint.name,
                route_pattern = %route.path_pattern,
                path_params = ?path_params,
                "Route matched"
            );
            return Some(RouteMatch {
                endpoint: Arc::clone(&route.endpoint),
                path_pattern: route.path_pattern.clone(),
                path_params,
            });
        }

        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Serve one request.
    ///
    /// `query` is the raw query string (leading `?` optional). Arguments are
    /// bound from the endpoint's host-facing parameters: path placeholders
    /// first, host-model parameters from the body, everything else from the
    /// query string.
    #[must_use]
    pub fn dispatch(&self, method: Method, path: &str, query: &str, body: Option<&JsonValue>) -> HostResponse {
        let Some(matched) = self.route(&method, path) else {
            let allowed = self.routes.iter().any(|r| r.regex.is_match(path));
            return if allowed {
                HostResponse::error(405, JsonValue::from("Method Not Allowed"))
            } else {
                HostResponse::error(404, JsonValue::from("Not Found"))
            };
        };

        let args = match bind_arguments(&matched, query, body) {
            Ok(args) => args,
            Err(issues) => {
                let detail = serde_json::to_value(&issues).unwrap_or(JsonValue::Null);
                return HostResponse::error(422, detail);
            }
        };

        into_response(&matched.endpoint.name, matched.endpoint.call(args))
    }

    /// Convert an OpenAPI-style path into a regex and its placeholder names.
    ///
    /// `{name}` matches one segment, `{name:path}` the rest of the path.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), regex::Error> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 5);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            let placeholder = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .filter(|inner| !inner.is_empty());
            match placeholder.map(|inner| inner.split_once(':').unwrap_or((inner, ""))) {
                Some((name, "path")) => {
                    pattern.push_str("/(.+)");
                    param_names.push(name.to_string());
                }
                Some((name, _)) => {
                    pattern.push_str("/([^/]+)");
                    param_names.push(name.to_string());
                }
                None if !segment.is_empty() => {
                    pattern.push('/');
                    pattern.push_str(&regex::escape(segment));
                }
                None => {}
            }
        }

        pattern.push('$');
        Ok((Regex::new(&pattern)?, param_names))
    }
}

fn bind_arguments(
    matched: &RouteMatch,
    query: &str,
    body: Option<&JsonValue>,
) -> Result<CallArgs, Vec<ValidationIssue>> {
    let endpoint = &matched.endpoint;
    let query_pairs: Vec<(String, String)> =
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect();
    let single_body = endpoint.params.iter().filter(|p| p.is_body()).count() == 1;

    let mut args = CallArgs::new();
    let mut issues = Vec::new();

    for param in &endpoint.params {
        let (location, bound) = if let Some(raw) = matched.get_path_param(&param.name) {
            ("path", Some(parse_raw(&param.annotation, &[raw])))
        } else if param.is_body() {
            let json = if single_body {
                body
            } else {
                body.and_then(|b| b.get(&param.name))
            };
            ("body", json.map(|j| parse_body(param, j)))
        } else {
            let raws: Vec<&str> = query_pairs
                .iter()
                .filter(|(k, _)| *k == param.name)
                .map(|(_, v)| v.as_str())
                .collect();
            let bound = (!raws.is_empty()).then(|| parse_raw(&param.annotation, &raws));
            ("query", bound)
        };

        match bound {
            Some(Ok(value)) => {
                args.keyword.insert(param.name.clone(), value);
            }
            Some(Err(found)) => issues.extend(found.into_iter().map(|mut issue| {
                let mut loc = vec![location.to_string(), param.name.clone()];
                loc.append(&mut issue.loc);
                issue.loc = loc;
                issue
            })),
            None => match &param.default {
                Some(default) => {
                    args.keyword.insert(param.name.clone(), default.clone());
                }
                None if matches!(param.annotation, TypeRef::Optional(_)) => {
                    args.keyword.insert(param.name.clone(), Value::Null);
                }
                None => issues.push(ValidationIssue::new(
                    vec![location.to_string(), param.name.clone()],
                    "field required",
                    JsonValue::Null,
                )),
            },
        }
    }

    if issues.is_empty() {
        Ok(args)
    } else {
        Err(issues)
    }
}

/// Parse raw path/query strings by the annotated type; repeated keys feed lists
fn parse_raw(annotation: &TypeRef, raws: &[&str]) -> Result<Value, Vec<ValidationIssue>> {
    let (ty, _) = annotation.strip_optional();
    let last = raws.last().copied().unwrap_or_default();
    let fail = |msg: String, raw: &str| vec![ValidationIssue::new(Vec::new(), msg, JsonValue::from(raw))];

    match ty {
        TypeRef::Scalar(kind) => kind.parse_str(last).map_err(|m| fail(m, last)),
        TypeRef::Primitive(p) => p.base.parse_str(last).map_err(|m| fail(m, last)),
        TypeRef::List(inner) | TypeRef::Set(inner) => {
            let kind = scalar_of(inner);
            let mut items = Vec::with_capacity(raws.len());
            for raw in raws {
                items.push(kind.parse_str(raw).map_err(|m| fail(m, raw))?);
            }
            Ok(if matches!(ty, TypeRef::Set(_)) {
                Value::Set(items)
            } else {
                Value::List(items)
            })
        }
        _ => Ok(serde_json::from_str::<JsonValue>(last)
            .map_or_else(|_| Value::Str(last.to_string()), |j| Value::from_json(&j))),
    }
}

fn scalar_of(ty: &TypeRef) -> ScalarKind {
    match ty.strip_optional().0 {
        TypeRef::Scalar(kind) => *kind,
        TypeRef::Primitive(p) => p.base,
        _ => ScalarKind::String,
    }
}

/// Validate a body value into the parameter's host model
fn parse_body(param: &ExternalParam, json: &JsonValue) -> Result<Value, Vec<ValidationIssue>> {
    if json.is_null() && matches!(param.annotation, TypeRef::Optional(_)) {
        return Ok(Value::Null);
    }
    let Some(class) = param.annotation.as_model_of(ModelKind::Host) else {
        return Ok(Value::from_json(json));
    };
    Instance::from_json(class, json).map(Value::Object).map_err(|e| {
        e.issues
            .into_iter()
            .map(|i| ValidationIssue::new(i.loc, i.message, i.input))
            .collect()
    })
}

fn into_response(handler_name: &str, result: Result<Value, HandlerError>) -> HostResponse {
    match result {
        Ok(Value::Response(response)) => Arc::unwrap_or_clone(response),
        Ok(value) => HostResponse::json(200, value.to_json()),
        Err(HandlerError::Http(e)) => HostResponse::error(e.status, e.detail),
        Err(HandlerError::Validation(e)) => HostResponse::error(422, e.detail()),
        Err(HandlerError::Failed { type_name, message }) => {
            warn!(
                handler_name = %handler_name,
                error_type = %type_name,
                message = %message,
                "Unhandled handler failure"
            );
            HostResponse::error(500, JsonValue::from("Internal Server Error"))
        }
    }
}
