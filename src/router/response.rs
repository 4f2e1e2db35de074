use serde::Serialize;
use serde_json::Value as JsonValue;
use smallvec::SmallVec;
use std::sync::Arc;

/// Response headers, stack-allocated for up to 16 entries.
///
/// Header names are `Arc<str>` so static names clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); 16]>;

/// The host framework's pre-built response envelope.
///
/// Handlers declaring this as their return type get a passthrough wrapper:
/// the value they return reaches the client untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: JsonValue,
}

impl HostResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: JsonValue) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON response with a `content-type` header
    #[must_use]
    pub fn json(status: u16, body: JsonValue) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Error response with a `{"detail": ...}` body
    #[must_use]
    pub fn error(status: u16, detail: JsonValue) -> Self {
        Self::json(status, serde_json::json!({ "detail": detail }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive)
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Canonical reason phrase of the status
    #[must_use]
    pub fn reason(&self) -> &'static str {
        status_reason(self.status)
    }
}

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "OK",
    }
}
