/// Derive a route path from a handler name and its parameter names.
///
/// The name is split on `__` into segments (empty ones dropped). A segment
/// that is itself a parameter becomes `{segment}`. A segment whose first
/// `_`-token is a parameter becomes `{token}` followed by the remaining tokens
/// joined with `-`. Any other segment is a literal with `_` replaced by `-`.
///
/// ```rust
/// use routebridge::router::parse_path;
///
/// assert_eq!(parse_path("v1__models_raw", &["models"]), "/v1/{models}/raw");
/// assert_eq!(parse_path::<&str>("v1__models_raw", &[]), "/v1/models-raw");
/// ```
#[must_use]
pub fn parse_path<S: AsRef<str>>(function_name: &str, params: &[S]) -> String {
    let is_param = |s: &str| params.iter().any(|p| p.as_ref() == s);
    let mut parts: Vec<String> = Vec::new();

    for segment in function_name.split("__").filter(|s| !s.is_empty()) {
        if is_param(segment) {
            parts.push(format!("{{{segment}}}"));
            continue;
        }
        if !segment.contains('_') {
            parts.push(segment.to_string());
            continue;
        }

        // the first token is taken raw: `_models` starts with an empty token
        let mut tokens = segment.split('_');
        match tokens.next() {
            Some(first) if is_param(first) => {
                parts.push(format!("{{{first}}}"));
                let rest: Vec<&str> = tokens.filter(|t| !t.is_empty()).collect();
                if !rest.is_empty() {
                    parts.push(rest.join("-"));
                }
            }
            _ => parts.push(segment.replace('_', "-")),
        }
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}
