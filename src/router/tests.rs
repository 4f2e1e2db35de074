use super::{HostResponse, RouteTable};
use crate::bridge::SchemaBridge;
use crate::config::BridgeConfig;
use crate::error::{HandlerError, HttpError};
use crate::signature::FunctionDef;
use crate::types::{ModelClass, PrimitiveType, ScalarKind, TypeRef};
use crate::value::{FromValue, Instance, Value};
use crate::wrapper::RouteBridge;
use http::Method;
use serde_json::json;
use std::sync::Arc;

fn route_bridge() -> RouteBridge {
    RouteBridge::with_bridge(Arc::new(SchemaBridge::new(BridgeConfig::default())))
}

#[test]
fn test_root_path() {
    let (re, params) = RouteTable::path_to_regex("/").unwrap();
    assert!(re.is_match("/"));
    assert!(params.is_empty());
}

#[test]
fn test_parameterized_path() {
    let (re, params) = RouteTable::path_to_regex("/items/{id}").unwrap();
    assert!(re.is_match("/items/123"));
    assert!(!re.is_match("/items/123/extra"));
    assert_eq!(params, vec!["id"]);
}

#[test]
fn test_nested_path() {
    let (re, params) = RouteTable::path_to_regex("/a/{b}/c").unwrap();
    assert!(re.is_match("/a/1/c"));
    assert_eq!(params, vec!["b"]);
}

#[test]
fn test_path_converter_spans_segments() {
    let (re, params) = RouteTable::path_to_regex("/files/{rest:path}").unwrap();
    assert!(re.is_match("/files/a/b/c.txt"));
    assert_eq!(params, vec!["rest"]);
}

#[test]
fn test_literal_segments_are_escaped() {
    let (re, _) = RouteTable::path_to_regex("/v1.0/items").unwrap();
    assert!(re.is_match("/v1.0/items"));
    assert!(!re.is_match("/v1x0/items"));
}

#[test]
fn test_path_params_decoded() {
    let bridge = route_bridge();
    let mut table = RouteTable::new();
    let def = FunctionDef::new("files__name", |mut args| {
        let name = String::from_value(args.take("name"))?;
        Ok(Value::Str(name))
    })
    .param("name", TypeRef::string());
    bridge.register_route_any(&mut table, &def, None).unwrap();

    let matched = table.route(&Method::GET, "/files/hello%20world").unwrap();
    assert_eq!(matched.get_path_param("name"), Some("hello world"));
    assert_eq!(matched.path_pattern, "/files/{name}");

    let response = table.dispatch(Method::GET, "/files/a%2Fb", "", None);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!("a/b"));
}

#[test]
fn test_not_found_and_method_not_allowed() {
    let bridge = route_bridge();
    let mut table = RouteTable::new();
    let def = FunctionDef::new("health", |_| Ok(Value::Str("ok".into())));
    bridge
        .register_route(&mut table, &def, "/health", &[Method::GET])
        .unwrap();

    assert_eq!(table.dispatch(Method::GET, "/health", "", None).status, 200);
    assert_eq!(table.dispatch(Method::POST, "/health", "", None).status, 405);
    assert_eq!(table.dispatch(Method::GET, "/nope", "", None).status, 404);
}

#[test]
fn test_reregistration_replaces_route() {
    let bridge = route_bridge();
    let mut table = RouteTable::new();
    let first = FunctionDef::new("first", |_| Ok(Value::Int(1)));
    let second = FunctionDef::new("second", |_| Ok(Value::Int(2)));
    bridge.register_route(&mut table, &first, "/n", &[Method::GET]).unwrap();
    bridge.register_route(&mut table, &second, "/n", &[Method::GET]).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.dispatch(Method::GET, "/n", "", None).body, json!(2));
}

#[test]
fn test_query_binding_and_primitive_validation() {
    let bridge = route_bridge();
    let mut table = RouteTable::new();
    let limit = PrimitiveType::new("Limit", ScalarKind::Integer)
        .minimum(1.0)
        .maximum(100.0)
        .build();
    let def = FunctionDef::new("list_items", |mut args| {
        let limit = i64::from_value(args.take("limit"))?;
        let tags = Vec::<String>::from_value(args.take("tags"))?;
        Ok(Value::from_json(&json!({ "limit": limit, "tags": tags })))
    })
    .param("limit", TypeRef::primitive(&limit))
    .param_with_default("tags", TypeRef::list(TypeRef::string()), Value::List(Vec::new()));
    bridge.register_route_any(&mut table, &def, None).unwrap();

    let ok = table.dispatch(Method::GET, "/list-items", "limit=5&tags=a&tags=b", None);
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body, json!({ "limit": 5, "tags": ["a", "b"] }));

    let defaulted = table.dispatch(Method::GET, "/list-items", "?limit=2", None);
    assert_eq!(defaulted.body, json!({ "limit": 2, "tags": [] }));

    let out_of_range = table.dispatch(Method::GET, "/list-items", "limit=500", None);
    assert_eq!(out_of_range.status, 422);
    assert_eq!(out_of_range.body["detail"][0]["loc"], json!(["query", "limit"]));

    let unparseable = table.dispatch(Method::GET, "/list-items", "limit=many", None);
    assert_eq!(unparseable.status, 422);
    assert_eq!(unparseable.body["detail"][0]["loc"], json!(["query", "limit"]));

    let missing = table.dispatch(Method::GET, "/list-items", "", None);
    assert_eq!(missing.status, 422);
    assert_eq!(missing.body["detail"][0]["msg"], "field required");
}

#[test]
fn test_body_binding_converts_to_domain_object() {
    let bridge = route_bridge();
    let mut table = RouteTable::new();
    let pet = ModelClass::domain("Pet")
        .field("name", TypeRef::string())
        .field_with_default("age", TypeRef::integer(), Value::Int(0))
        .build();
    let pet_class = Arc::clone(&pet);
    let def = FunctionDef::new("create_pet", move |mut args| {
        let pet = Instance::from_value(args.take("pet"))?;
        assert_eq!(pet.class().id(), pet_class.id());
        Ok(Value::Object(pet))
    })
    .param("pet", TypeRef::model(&pet))
    .returns(TypeRef::model(&pet));
    bridge
        .register_route(&mut table, &def, "/pets", &[Method::POST])
        .unwrap();

    let created = table.dispatch(Method::POST, "/pets", "", Some(&json!({ "name": "rex" })));
    assert_eq!(created.status, 200);
    assert_eq!(created.body, json!({ "name": "rex", "age": 0 }));
    assert_eq!(created.get_header("content-type"), Some("application/json"));

    let invalid = table.dispatch(Method::POST, "/pets", "", Some(&json!({ "age": "old" })));
    assert_eq!(invalid.status, 422);
    let locs: Vec<_> = invalid.body["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["loc"].clone())
        .collect();
    assert!(locs.contains(&json!(["body", "pet", "name"])));
    assert!(locs.contains(&json!(["body", "pet", "age"])));
}

#[test]
fn test_handler_errors_rendered() {
    let bridge = route_bridge();
    let mut table = RouteTable::new();
    let teapot = FunctionDef::new("teapot", |_| Err(HttpError::new(418, "short and stout").into()));
    let failing = FunctionDef::new("failing", |_| {
        Err(HandlerError::Failed {
            type_name: "KeyError".into(),
            message: "gone".into(),
        })
    });
    bridge.register_route(&mut table, &teapot, "/teapot", &[Method::GET]).unwrap();
    bridge.register_route(&mut table, &failing, "/failing", &[Method::GET]).unwrap();

    let response = table.dispatch(Method::GET, "/teapot", "", None);
    assert_eq!(response.status, 418);
    assert_eq!(response.body, json!({ "detail": "short and stout" }));

    let response = table.dispatch(Method::GET, "/failing", "", None);
    assert_eq!(response.status, 500);
}

#[test]
fn test_host_response_returned_verbatim() {
    let bridge = route_bridge();
    let mut table = RouteTable::new();
    let def = FunctionDef::new("created", |_| {
        let mut response = HostResponse::json(201, json!({ "id": 7 }));
        response.set_header("location", "/things/7".to_string());
        Ok(Value::Response(Arc::new(response)))
    })
    .returns(TypeRef::Response);
    bridge.register_route(&mut table, &def, "/things", &[Method::POST]).unwrap();

    let response = table.dispatch(Method::POST, "/things", "", None);
    assert_eq!(response.status, 201);
    assert_eq!(response.get_header("location"), Some("/things/7"));
    assert_eq!(response.body, json!({ "id": 7 }));
}

#[test]
fn test_route_summaries() {
    let bridge = route_bridge();
    let mut table = RouteTable::new();
    let def = FunctionDef::new("ping", |_| Ok(Value::Null));
    bridge
        .register_route(&mut table, &def, "/ping", &[Method::GET, Method::HEAD])
        .unwrap();
    assert_eq!(
        table.route_summaries(),
        vec!["GET /ping -> ping".to_string(), "HEAD /ping -> ping".to_string()]
    );
}
