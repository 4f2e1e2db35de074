use super::{snake_case, SchemaBridge};
use crate::types::ModelClass;
use serde_json::{json, Value as JsonValue};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Tool / function-call description conventions.
///
/// Every format wraps the same [`SchemaBridge::json_schema`] document; only
/// the envelope differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolFormat {
    /// `{"type": "function", "function": {name, description, parameters, strict}}`
    OpenAi,
    /// `{name, description, input_schema}`
    Anthropic,
    /// `{name, description, parameters}`, parameters without `$schema`
    Gemini,
    /// `{name, description, inputSchema}`
    Mcp,
}

impl ToolFormat {
    pub const ALL: [ToolFormat; 4] = [
        ToolFormat::OpenAi,
        ToolFormat::Anthropic,
        ToolFormat::Gemini,
        ToolFormat::Mcp,
    ];

    /// The schema embedded in an envelope of this format
    #[must_use]
    pub fn parameters<'a>(&self, envelope: &'a JsonValue) -> Option<&'a JsonValue> {
        match self {
            ToolFormat::OpenAi => envelope.get("function")?.get("parameters"),
            ToolFormat::Anthropic => envelope.get("input_schema"),
            ToolFormat::Gemini => envelope.get("parameters"),
            ToolFormat::Mcp => envelope.get("inputSchema"),
        }
    }
}

impl fmt::Display for ToolFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToolFormat::OpenAi => "openai",
            ToolFormat::Anthropic => "anthropic",
            ToolFormat::Gemini => "gemini",
            ToolFormat::Mcp => "mcp",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ToolFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" | "open_ai" => Ok(ToolFormat::OpenAi),
            "anthropic" | "claude" => Ok(ToolFormat::Anthropic),
            "gemini" | "google" => Ok(ToolFormat::Gemini),
            "mcp" => Ok(ToolFormat::Mcp),
            other => Err(format!("unknown tool format '{other}'")),
        }
    }
}

impl SchemaBridge {
    /// Tool description of `class` in `format`.
    ///
    /// The tool name defaults to the class name in snake_case, the description
    /// to the class description. Strictness falls back to
    /// [`crate::config::BridgeConfig::strict_tool_schemas`].
    pub fn tool_spec(
        &self,
        class: &Arc<ModelClass>,
        format: ToolFormat,
        name: Option<&str>,
        strict: Option<bool>,
    ) -> JsonValue {
        let strict = strict.unwrap_or(self.config.strict_tool_schemas);
        let name = name.map_or_else(|| snake_case(&class.name), str::to_string);
        let description = class.description.clone().unwrap_or_default();
        let schema = (*self.json_schema(class, strict)).clone();

        match format {
            ToolFormat::OpenAi => json!({
                "type": "function",
                "function": {
                    "name": name,
                    "description": description,
                    "parameters": schema,
                    "strict": strict,
                },
            }),
            ToolFormat::Anthropic => json!({
                "name": name,
                "description": description,
                "input_schema": schema,
            }),
            ToolFormat::Gemini => {
                let mut parameters = schema;
                if let JsonValue::Object(obj) = &mut parameters {
                    obj.remove("$schema");
                }
                json!({
                    "name": name,
                    "description": description,
                    "parameters": parameters,
                })
            }
            ToolFormat::Mcp => json!({
                "name": name,
                "description": description,
                "inputSchema": schema,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;
    use crate::value::Value;

    #[test]
    fn test_envelopes() {
        let bridge = SchemaBridge::default();
        let search = ModelClass::domain("WebSearch")
            .description("Search the web")
            .field("query", TypeRef::string())
            .field_with_default("limit", TypeRef::integer(), Value::Int(5))
            .build();

        let openai = bridge.tool_spec(&search, ToolFormat::OpenAi, None, None);
        assert_eq!(openai["type"], "function");
        assert_eq!(openai["function"]["name"], "web_search");
        assert_eq!(openai["function"]["strict"], false);

        let gemini = bridge.tool_spec(&search, ToolFormat::Gemini, Some("search"), None);
        assert_eq!(gemini["name"], "search");
        assert!(gemini["parameters"].get("$schema").is_none());

        let mcp = bridge.tool_spec(&search, ToolFormat::Mcp, None, Some(true));
        let params = ToolFormat::Mcp.parameters(&mcp).unwrap();
        assert_eq!(params["required"], serde_json::json!(["query", "limit"]));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("OpenAI".parse::<ToolFormat>().unwrap(), ToolFormat::OpenAi);
        assert!("smoke-signals".parse::<ToolFormat>().is_err());
    }
}
