#![allow(dead_code)]

use routebridge::config::BridgeConfig;
use routebridge::types::{DefaultFactory, FieldDef, FieldDefault, ModelClass, PrimitiveType, ScalarKind, TypeRef};
use routebridge::value::Value;
use routebridge::SchemaBridge;
use std::sync::Arc;

/// Bridge with its own caches so tests never observe each other's classes
pub fn isolated_bridge() -> Arc<SchemaBridge> {
    Arc::new(SchemaBridge::new(BridgeConfig::default()))
}

pub struct PetStore {
    pub pet_id: Arc<PrimitiveType>,
    pub pet_name: Arc<PrimitiveType>,
    pub tag: Arc<ModelClass>,
    pub pet: Arc<ModelClass>,
    pub owner: Arc<ModelClass>,
}

/// Domain classes with nesting, optionals, containers and mutable defaults
pub fn pet_store() -> PetStore {
    let pet_id = PrimitiveType::new("PetId", ScalarKind::Integer)
        .minimum(1.0)
        .description("Positive pet identifier")
        .build();
    let pet_name = PrimitiveType::new("PetName", ScalarKind::String)
        .min_length(1)
        .max_length(32)
        .build();
    let tag = ModelClass::domain("Tag")
        .field("label", TypeRef::string())
        .field_with_default("weight", TypeRef::float(), Value::Float(1.0))
        .build();
    let pet = ModelClass::domain("Pet")
        .description("A pet in the store")
        .field("id", TypeRef::primitive(&pet_id))
        .field("name", TypeRef::primitive(&pet_name))
        .field_with_default("tags", TypeRef::list(TypeRef::model(&tag)), Value::List(Vec::new()))
        .field_def(FieldDef {
            name: "attributes".to_string(),
            ty: TypeRef::map(TypeRef::string()),
            default: FieldDefault::Factory(DefaultFactory::new(|| Value::Map(Default::default()))),
            description: Some("Free-form attributes".to_string()),
        })
        .build();
    let owner = ModelClass::domain("Owner")
        .field("name", TypeRef::string())
        .field_with_default("favourite", TypeRef::optional(TypeRef::model(&pet)), Value::Null)
        .field_with_default("pets", TypeRef::list(TypeRef::model(&pet)), Value::List(Vec::new()))
        .build();

    PetStore {
        pet_id,
        pet_name,
        tag,
        pet,
        owner,
    }
}
