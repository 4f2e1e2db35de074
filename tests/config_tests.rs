#![allow(clippy::unwrap_used, clippy::expect_used)]

use routebridge::config::{BridgeConfig, DRAFT_07};
use routebridge::types::{ModelClass, TypeRef};
use routebridge::value::Value;
use routebridge::SchemaBridge;
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "include_defaults: false\nstrict_tool_schemas: true\nschema_dialect: \"https://json-schema.org/draft/2020-12/schema\""
    )
    .unwrap();

    let config = BridgeConfig::load(file.path()).unwrap();
    assert!(!config.include_defaults);
    assert!(config.strict_tool_schemas);
    assert_eq!(config.schema_dialect, "https://json-schema.org/draft/2020-12/schema");
}

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "strict_tool_schemas: true").unwrap();

    let config = BridgeConfig::load(file.path()).unwrap();
    assert!(config.include_defaults);
    assert_eq!(config.schema_dialect, DRAFT_07);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = BridgeConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"));
}

#[test]
fn test_malformed_yaml_rejected() {
    assert!(BridgeConfig::from_yaml_str("include_defaults: [1, 2").is_err());
}

#[test]
fn test_config_shapes_generated_schema() {
    let config = BridgeConfig::from_yaml_str("include_defaults: false\nstrict_tool_schemas: true").unwrap();
    let bridge = SchemaBridge::new(config);
    let class = ModelClass::domain("Query")
        .field("text", TypeRef::string())
        .field_with_default("limit", TypeRef::integer(), Value::Int(10))
        .build();

    let schema = bridge.json_schema(&class, false);
    assert!(schema["properties"]["limit"].get("default").is_none());

    let tool = bridge.tool_spec(&class, routebridge::ToolFormat::OpenAi, None, None);
    assert_eq!(tool["function"]["strict"], true);
    assert_eq!(
        tool["function"]["parameters"]["required"],
        serde_json::json!(["text", "limit"])
    );
}
