//! Fact building and validation through the registry.

use drover_foundation::{ErrorKind, Type, Value};
use drover_schema::{FactSchema, FieldSchema, SchemaRegistry};

fn client_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    let client = registry.interner_mut().intern_type("Client");
    let id = registry.interner_mut().intern_field("id");
    let status = registry.interner_mut().intern_field("status");
    let active = registry.interner_mut().intern_field("active");

    registry
        .register(
            FactSchema::new(client)
                .with_field(FieldSchema::required(id, Type::Int))
                .with_field(FieldSchema::required(status, Type::String))
                .with_field(FieldSchema::optional(active, Type::Bool, Value::Bool(true))),
        )
        .unwrap();
    registry
}

#[test]
fn build_orders_fields_by_schema() {
    let registry = client_registry();
    let client = registry.type_id("Client").unwrap();
    let id = registry.field_id("id").unwrap();
    let status = registry.field_id("status").unwrap();

    // Supplied out of order
    let fact = registry
        .build(client, &[(status, Value::from("VIP")), (id, Value::Int(7))])
        .unwrap();

    assert_eq!(fact.field(0), &Value::Int(7));
    assert_eq!(fact.field(1), &Value::from("VIP"));
    // Optional field defaulted
    assert_eq!(fact.field(2), &Value::Bool(true));
}

#[test]
fn build_rejects_wrong_type() {
    let registry = client_registry();
    let client = registry.type_id("Client").unwrap();
    let id = registry.field_id("id").unwrap();
    let status = registry.field_id("status").unwrap();

    let err = registry
        .build(
            client,
            &[(id, Value::from("seven")), (status, Value::from("VIP"))],
        )
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch {
            expected: Type::Int,
            actual: Type::String,
        }
    ));
}

#[test]
fn build_rejects_missing_required() {
    let registry = client_registry();
    let client = registry.type_id("Client").unwrap();
    let id = registry.field_id("id").unwrap();

    let err = registry.build(client, &[(id, Value::Int(7))]).unwrap_err();
    match err.kind {
        ErrorKind::MissingField { field, .. } => assert_eq!(field, "status"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[test]
fn optional_override_beats_default() {
    let registry = client_registry();
    let client = registry.type_id("Client").unwrap();
    let id = registry.field_id("id").unwrap();
    let status = registry.field_id("status").unwrap();
    let active = registry.field_id("active").unwrap();

    let fact = registry
        .build(
            client,
            &[
                (id, Value::Int(7)),
                (status, Value::from("VIP")),
                (active, Value::Bool(false)),
            ],
        )
        .unwrap();
    assert_eq!(fact.field(2), &Value::Bool(false));
}

#[test]
fn duplicate_registration_rejected() {
    let mut registry = client_registry();
    let client = registry.type_id("Client").unwrap();

    let err = registry.register(FactSchema::new(client)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateFactType(_)));
}

#[test]
fn names_resolve_only_after_interning() {
    let registry = client_registry();
    assert!(registry.type_id("Client").is_some());
    assert!(registry.type_id("Unknown").is_none());
    assert!(registry.field_id("status").is_some());
    assert!(registry.field_id("missing").is_none());
}
