use entype::compile::CompileError;
use entype::inference::{infer_field, FieldOutcome, InferenceContext};
use entype::model::{DataType, Field, JoinCondition, ValueLabel};
use entype::schema::SchemaNode;
use insta::assert_snapshot;
use serde_json::{json, Value};

fn ctx() -> InferenceContext {
    InferenceContext::new("department", "${tenant_id}_mod_users")
}

fn infer(property: &str, schema: Value) -> FieldOutcome {
    infer_field(property, SchemaNode::new(&schema), &ctx()).unwrap()
}

fn field(property: &str, schema: Value) -> Field {
    infer(property, schema).field.unwrap()
}

// ============================================================================
// Naming and Getters
// ============================================================================

#[test]
fn test_uuid_field() {
    let field = field("dept_id", json!({ "type": "string", "format": "uuid" }));
    assert_eq!(field.name, "dept_id");
    assert_eq!(field.data_type, DataType::RangedUuid);
    assert!(!field.is_id_column());
    assert_eq!(field.value_getter.as_deref(), Some(":department.jsonb->>'dept_id'"));
    assert_eq!(field.filter_value_getter, None);
    assert_eq!(field.value_function, None);
    assert!(field.queryable);
    assert!(!field.visible_by_default);
}

#[test]
fn test_camel_case_property_is_snake_cased() {
    let field = field("createdByUserId", json!({ "type": "string" }));
    assert_eq!(field.name, "created_by_user_id");
    assert_eq!(field.value_getter.as_deref(), Some(":department.jsonb->>'createdByUserId'"));
}

#[test]
fn test_digit_suffix_stays_on_its_word() {
    let field = field("addressLine1", json!({ "type": "string" }));
    assert_eq!(field.name, "address_line1");
    assert_eq!(field.value_getter.as_deref(), Some(":department.jsonb->>'addressLine1'"));
}

#[test]
fn test_nested_object_getters() {
    let field = field(
        "metadata",
        json!({
            "type": "object",
            "properties": {
                "createdDate": { "type": "string", "format": "date-time" },
                "updatedCount": { "type": "integer" }
            }
        }),
    );
    assert_eq!(field.value_getter.as_deref(), Some(":department.jsonb->'metadata'"));
    assert!(!field.queryable);

    let properties = field.data_type.properties().unwrap();
    assert_snapshot!(
        properties[0].value_getter.as_deref().unwrap(),
        @":department.jsonb->'metadata'->>'createdDate'"
    );
    assert_snapshot!(
        properties[1].value_getter.as_deref().unwrap(),
        @"(:department.jsonb->'metadata'->>'updatedCount')::integer"
    );
}

#[test]
fn test_array_of_objects_getters() {
    let field = field(
        "addresses",
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "city": { "type": "string" },
                    "zip": { "type": "integer" }
                }
            }
        }),
    );
    assert_eq!(field.value_getter.as_deref(), Some(":department.jsonb->'addresses'"));

    let item = field.data_type.item().unwrap();
    let properties = item.properties().unwrap();
    assert_snapshot!(
        properties[0].value_getter.as_deref().unwrap(),
        @"(SELECT array_agg(elems.value->>'city') FROM jsonb_array_elements(:department.jsonb->'addresses') AS elems)"
    );
    assert_snapshot!(
        properties[0].filter_value_getter.as_deref().unwrap(),
        @"(SELECT array_agg(lower(elems.value->>'city')) FROM jsonb_array_elements(:department.jsonb->'addresses') AS elems)"
    );
    assert_snapshot!(
        properties[1].value_getter.as_deref().unwrap(),
        @"(SELECT array_agg((elems.value->>'zip')::integer) FROM jsonb_array_elements(:department.jsonb->'addresses') AS elems)"
    );
    assert_eq!(properties[1].value_function.as_deref(), Some("(:value)::integer"));
}

#[test]
fn test_getter_overrides() {
    let field = field(
        "code",
        json!({
            "type": "string",
            "x-fqm-value-getter": "${source}.code",
            "x-fqm-filter-value-getter": null
        }),
    );
    assert_eq!(field.value_getter.as_deref(), Some(":department.code"));
    assert_eq!(field.filter_value_getter, None);
}

// ============================================================================
// Values and Extensions
// ============================================================================

#[test]
fn test_enum_values_are_labeled() {
    let field = field("status", json!({ "type": "string", "enum": ["in_progress", "done"] }));
    assert_eq!(
        field.values,
        Some(vec![
            ValueLabel::new("in_progress", "In progress"),
            ValueLabel::new("done", "Done"),
        ])
    );
}

#[test]
fn test_boolean_values() {
    let field = field("active", json!({ "type": "boolean" }));
    assert_eq!(
        field.values,
        Some(vec![ValueLabel::new("true", "True"), ValueLabel::new("false", "False")])
    );
}

#[test]
fn test_unknown_extension_is_reported() {
    let outcome = infer("code", json!({ "type": "string", "x-fqm-bogus": 1, "x-fqm-other": 2 }));
    assert_eq!(
        outcome.issues,
        vec!["Invalid custom properties found for property code: x-fqm-bogus, x-fqm-other"]
    );
    assert!(outcome.field.is_some());
}

#[test]
fn test_malformed_extension_value_is_ignored() {
    let outcome = infer("code", json!({ "type": "string", "x-fqm-essential": "yes" }));
    assert_eq!(outcome.issues.len(), 1);
    assert!(outcome.issues[0].starts_with("Invalid value for x-fqm-essential in property code"));
    assert_eq!(outcome.field.unwrap().essential, None);
}

#[test]
fn test_invalid_visibility_is_fatal() {
    let schema = json!({ "type": "string", "x-fqm-visibility": "sometimes" });
    let err = infer_field("code", SchemaNode::new(&schema), &ctx()).unwrap_err();
    assert_eq!(
        err,
        CompileError::InvalidVisibility {
            property: "code".to_string(),
            value: "sometimes".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "Invalid value for x-fqm-visibility in property code: sometimes"
    );
}

#[test]
fn test_nested_invalid_visibility_is_fatal() {
    let schema = json!({
        "type": "object",
        "properties": { "inner": { "type": "string", "x-fqm-visibility": "nope" } }
    });
    assert!(infer_field("outer", SchemaNode::new(&schema), &ctx()).is_err());
}

#[test]
fn test_joins_are_kept_intermediate() {
    let field = field(
        "dept_id",
        json!({
            "type": "string",
            "format": "uuid",
            "x-fqm-joins-to": [
                { "targetModule": "mod-users", "targetEntity": "simple_user", "targetField": "id" }
            ],
            "x-fqm-joins-to-raw": [
                { "targetId": "00000000-0000-0000-0000-000000000001", "targetField": "id", "type": "equality-simple" }
            ]
        }),
    );
    assert_eq!(field.joins_to_intermediate.len(), 1);
    assert_eq!(field.joins_to_intermediate[0].target_label(), "mod-users__simple_user");
    let raw = field.joins_to.unwrap();
    assert_eq!(raw[0].condition, JoinCondition::EqualitySimple);
}

#[test]
fn test_empty_raw_joins_are_omitted() {
    let field = field(
        "dept_id",
        json!({ "type": "string", "format": "uuid", "x-fqm-joins-to-raw": [] }),
    );
    assert!(field.joins_to.is_none());
    let serialized = serde_json::to_value(&field).unwrap();
    assert!(serialized.get("joinsTo").is_none());
}

#[test]
fn test_malformed_joins_are_dropped() {
    let outcome = infer(
        "dept_id",
        json!({ "type": "string", "x-fqm-joins-to": [{ "targetModule": "m" }] }),
    );
    assert_eq!(outcome.issues.len(), 1);
    assert!(outcome.issues[0].starts_with("Error parsing x-fqm-joins-to"));
    assert!(outcome.field.unwrap().joins_to_intermediate.is_empty());
}
