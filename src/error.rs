//! # Error Module
//!
//! Every failure the bridge can produce, grouped the way they surface:
//!
//! - **Registration time**: [`AnalysisError`], [`ClassConversionTypeError`],
//!   wrapped together as [`RegistrationError`]. These are fatal for the route.
//! - **Request time**: [`ParameterConversionError`] for a single coerced value,
//!   [`AggregatedValidationError`] when the query wrapper collects several of them,
//!   and [`HandlerExecutionError`] for anything else escaping a handler body.
//! - **Host native**: [`HttpError`] and [`AggregatedValidationError`] are the host
//!   framework's own error types. Wrappers never intercept them.
//!
//! Handlers report failures through [`HandlerError`], which keeps host-native
//! errors distinct from arbitrary failures so the wrapper boundary can convert
//! the latter exactly once.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

/// A handler's declared types could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// A forward reference in the function signature names no registered type
    #[error("cannot resolve type `{name}` for `{location}` in function `{function}`")]
    UnresolvedType {
        /// Function being analyzed
        function: String,
        /// Parameter name, or `return`
        location: String,
        /// The unresolved type name
        name: String,
    },
    /// A class reachable from the signature still carries an unresolved field type
    #[error("class `{class}` field `{field}` references unresolved type `{name}` (function `{function}`)")]
    UnresolvedField {
        /// Function being analyzed
        function: String,
        /// Owning class
        class: String,
        /// Field carrying the forward reference
        field: String,
        /// The unresolved type name
        name: String,
    },
}

/// Wrong kind of argument passed to a schema bridge entry point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, received {received}")]
pub struct ClassConversionTypeError {
    /// What the entry point accepts
    pub expected: String,
    /// What it was given
    pub received: String,
}

impl ClassConversionTypeError {
    pub fn new(expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            received: received.into(),
        }
    }
}

/// One failing field within a model validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    /// Path of field names from the validated model down to the failing value
    pub loc: Vec<String>,
    /// Human readable reason
    pub message: String,
    /// The offending value as JSON
    pub input: JsonValue,
}

/// A model instance failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} validation error(s) for {model}: {}", .issues.len(), render_field_issues(.issues))]
pub struct ValidationError {
    /// Name of the model class being built
    pub model: String,
    /// Every failing field
    pub issues: Vec<FieldIssue>,
}

fn render_field_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| {
            if i.loc.is_empty() {
                i.message.clone()
            } else {
                format!("{}: {}", i.loc.join("."), i.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure converting an instance between representations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    ClassType(#[from] ClassConversionTypeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A single incoming value failed coercion into its declared type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid value for parameter `{parameter}`: {message}")]
pub struct ParameterConversionError {
    pub parameter: String,
    pub message: String,
    /// The offending input as JSON
    pub input: JsonValue,
}

/// One entry of an [`AggregatedValidationError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Location path, e.g. `["query", "limit"]`
    pub loc: Vec<String>,
    pub msg: String,
    pub input: JsonValue,
}

impl ValidationIssue {
    pub fn new(loc: Vec<String>, msg: impl Into<String>, input: JsonValue) -> Self {
        ValidationIssue {
            loc,
            msg: msg.into(),
            input,
        }
    }
}

/// Request validation failed for one or more parameters.
///
/// This is the host framework's request-validation error; wrappers let it
/// propagate untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} request validation error(s)", .errors.len())]
pub struct AggregatedValidationError {
    pub errors: Vec<ValidationIssue>,
}

impl AggregatedValidationError {
    /// Render the failure list the way the host reports it (`{"detail": [...]}`)
    #[must_use]
    pub fn detail(&self) -> JsonValue {
        serde_json::to_value(&self.errors).unwrap_or(JsonValue::Null)
    }
}

/// The host framework's HTTP error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("HTTP {status}: {detail}")]
pub struct HttpError {
    pub status: u16,
    pub detail: JsonValue,
}

impl HttpError {
    pub fn new(status: u16, detail: impl Into<JsonValue>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

/// A non-host failure escaped a wrapped handler.
///
/// Only the error's type name and message are kept, never a backtrace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{type_name}: {message}")]
pub struct HandlerExecutionError {
    pub type_name: String,
    pub message: String,
}

/// Status used for converted handler failures.
pub const HANDLER_FAILURE_STATUS: u16 = 400;

impl From<HandlerExecutionError> for HttpError {
    fn from(err: HandlerExecutionError) -> Self {
        HttpError::new(
            HANDLER_FAILURE_STATUS,
            serde_json::json!({
                "error_type": err.type_name,
                "message": err.message,
            }),
        )
    }
}

/// Error channel of every handler and endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerError {
    /// Host-native HTTP error, propagated unchanged
    Http(HttpError),
    /// Host-native request validation error, propagated unchanged
    Validation(AggregatedValidationError),
    /// Anything else; converted at the wrapper boundary
    Failed { type_name: String, message: String },
}

impl HandlerError {
    /// Wrap an arbitrary error, keeping only its short type name and message
    pub fn failed<E: std::error::Error>(err: &E) -> Self {
        HandlerError::Failed {
            type_name: short_type_name::<E>().to_string(),
            message: err.to_string(),
        }
    }

    /// Whether this error belongs to the host framework
    #[must_use]
    pub fn is_host_native(&self) -> bool {
        matches!(self, HandlerError::Http(_) | HandlerError::Validation(_))
    }

    /// Convert a non-host failure into the uniform client error.
    ///
    /// Host-native errors come back unchanged, so applying this twice is a no-op.
    #[must_use]
    pub fn into_client_error(self) -> Self {
        match self {
            HandlerError::Failed { type_name, message } => {
                HandlerError::Http(HandlerExecutionError { type_name, message }.into())
            }
            native => native,
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Http(e) => write!(f, "{e}"),
            HandlerError::Validation(e) => write!(f, "{e}"),
            HandlerError::Failed { type_name, message } => write!(f, "{type_name}: {message}"),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<HttpError> for HandlerError {
    fn from(err: HttpError) -> Self {
        HandlerError::Http(err)
    }
}

impl From<AggregatedValidationError> for HandlerError {
    fn from(err: AggregatedValidationError) -> Self {
        HandlerError::Validation(err)
    }
}

impl From<ParameterConversionError> for HandlerError {
    fn from(err: ParameterConversionError) -> Self {
        HandlerError::failed(&err)
    }
}

impl From<BridgeError> for HandlerError {
    fn from(err: BridgeError) -> Self {
        HandlerError::failed(&err)
    }
}

impl From<ValidationError> for HandlerError {
    fn from(err: ValidationError) -> Self {
        HandlerError::failed(&err)
    }
}

impl From<crate::value::ValueTypeError> for HandlerError {
    fn from(err: crate::value::ValueTypeError) -> Self {
        HandlerError::failed(&err)
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::Failed {
            type_name: "Error".to_string(),
            message: format!("{err:#}"),
        }
    }
}

/// Route registration failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Conversion(#[from] ClassConversionTypeError),
    #[error(transparent)]
    Router(#[from] crate::router::RouteError),
}

/// Last path segment of a type name, generics stripped (`crate::a::Foo<T>` → `Foo`).
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
