use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use routebridge::config::BridgeConfig;
use routebridge::signature::FunctionDef;
use routebridge::types::{ModelClass, PrimitiveType, ScalarKind, TypeRef};
use routebridge::value::{CallArgs, Instance, Value};
use routebridge::{RouteBridge, RouteTable, SchemaBridge};
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;

fn pet_class() -> Arc<ModelClass> {
    let pet_id = PrimitiveType::new("PetId", ScalarKind::Integer).minimum(1.0).build();
    let tag = ModelClass::domain("Tag").field("label", TypeRef::string()).build();
    ModelClass::domain("Pet")
        .field("id", TypeRef::primitive(&pet_id))
        .field("name", TypeRef::string())
        .field_with_default("tags", TypeRef::list(TypeRef::model(&tag)), Value::List(Vec::new()))
        .build()
}

fn bench_class_conversion(c: &mut Criterion) {
    let bridge = SchemaBridge::new(BridgeConfig::default());
    let pet = pet_class();
    let _ = bridge.to_host_class(&pet);

    c.bench_function("class_conversion_cached", |b| {
        b.iter(|| black_box(bridge.to_host_class(black_box(&pet))))
    });
    c.bench_function("json_schema_cached", |b| {
        b.iter(|| black_box(bridge.json_schema(black_box(&pet), false)))
    });
}

fn bench_instance_round_trip(c: &mut Criterion) {
    let bridge = SchemaBridge::new(BridgeConfig::default());
    let pet = pet_class();
    let Ok(instance) = Instance::from_json(
        &pet,
        &json!({"id": 1, "name": "rex", "tags": [{"label": "a"}, {"label": "b"}]}),
    ) else {
        return;
    };

    c.bench_function("instance_round_trip", |b| {
        b.iter(|| {
            let host = bridge.to_host_instance(Value::Object(instance.clone()));
            black_box(host.and_then(|h| bridge.to_domain_instance(h)))
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let pet = pet_class();
    let bridge = RouteBridge::with_bridge(Arc::new(SchemaBridge::new(BridgeConfig::default())));
    let mut table = RouteTable::new();
    let def = FunctionDef::new("create_pet", |mut args: CallArgs| Ok(args.take("pet")))
        .param("pet", TypeRef::model(&pet))
        .returns(TypeRef::model(&pet));
    if bridge
        .register_route(&mut table, &def, "/pets", &[Method::POST])
        .is_err()
    {
        return;
    }
    let body = json!({"id": 3, "name": "bo", "tags": [{"label": "calm"}]});

    c.bench_function("dispatch_body_wrapper", |b| {
        b.iter(|| black_box(table.dispatch(Method::POST, "/pets", "", Some(&body))))
    });
}

criterion_group!(
    benches,
    bench_class_conversion,
    bench_instance_round_trip,
    bench_dispatch
);
criterion_main!(benches);
