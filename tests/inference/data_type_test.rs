use entype::inference::{infer_data_type, InferenceContext, MAX_SCHEMA_DEPTH};
use entype::model::{DataType, DataTypeValue};
use entype::schema::SchemaNode;
use serde_json::{json, Value};

fn ctx() -> InferenceContext {
    InferenceContext::new("source", "${tenant_id}_mod_test")
}

fn infer(schema: Value) -> (DataType, Vec<String>) {
    infer_data_type(SchemaNode::new(&schema), &ctx()).unwrap()
}

// ============================================================================
// Leaf Types
// ============================================================================

#[test]
fn test_primitive_types() {
    let cases = [
        (json!({ "type": "string" }), DataType::String),
        (json!({ "type": ["string", "null"] }), DataType::String),
        (json!({ "type": "boolean" }), DataType::Boolean),
        (json!({ "type": "integer" }), DataType::Integer),
        (json!({ "type": "number" }), DataType::Number),
        (json!({ "type": "string", "format": "date" }), DataType::Date),
        (json!({ "type": "string", "format": "date-time" }), DataType::Date),
        (json!({ "type": "string", "format": "uuid" }), DataType::RangedUuid),
    ];

    for (schema, expected) in cases {
        let (data_type, issues) = infer(schema.clone());
        assert_eq!(data_type, expected, "schema: {}", schema);
        assert!(issues.is_empty(), "schema: {} issues: {:?}", schema, issues);
    }
}

#[test]
fn test_uuid_patterns() {
    let (data_type, issues) = infer(json!({
        "type": "string",
        "pattern": "^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$"
    }));
    assert_eq!(data_type, DataType::RangedUuid);
    assert!(issues.is_empty());

    let (data_type, _) = infer(json!({ "type": "string", "pattern": "^[a-z]+$" }));
    assert_eq!(data_type, DataType::String);
}

#[test]
fn test_uuid_reference() {
    let (data_type, issues) = infer(json!({ "$ref": "../common/uuid.json" }));
    assert_eq!(data_type, DataType::RangedUuid);
    assert!(issues.is_empty());
}

#[test]
fn test_unknown_reference_is_string_with_issue() {
    let (data_type, issues) = infer(json!({ "$ref": "../common/metadata.json" }));
    assert_eq!(data_type, DataType::String);
    assert_eq!(issues, vec!["Unknown reference: \"../common/metadata.json\""]);
}

#[test]
fn test_unknown_type_is_string_with_issue() {
    let (data_type, issues) = infer(json!({ "type": "null" }));
    assert_eq!(data_type, DataType::String);
    assert_eq!(issues, vec!["Unknown type: null"]);

    let (_, issues) = infer(json!({}));
    assert_eq!(issues, vec!["Unknown type: undefined"]);
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn test_data_type_override_wins() {
    let (data_type, issues) = infer(json!({ "type": "string", "x-fqm-data-type": "openUUIDType" }));
    assert_eq!(data_type, DataType::OpenUuid);
    assert!(issues.is_empty());
}

#[test]
fn test_every_leaf_tag_can_be_forced() {
    for tag in DataTypeValue::ALL {
        let schema = json!({ "type": "string", "x-fqm-data-type": tag.as_str(), "items": { "type": "integer" } });
        let (data_type, issues) = infer(schema);
        assert_eq!(data_type.value(), tag);
        assert!(issues.is_empty(), "tag {} issues: {:?}", tag, issues);
    }
}

#[test]
fn test_unknown_override_falls_back_to_inference() {
    let (data_type, issues) = infer(json!({ "type": "integer", "x-fqm-data-type": "weirdType" }));
    assert_eq!(data_type, DataType::Integer);
    assert_eq!(issues, vec!["Unknown data type override: weirdType"]);
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_array_defaults_to_jsonb_array() {
    let (data_type, issues) = infer(json!({ "type": "array", "items": { "type": "integer" } }));
    assert_eq!(data_type, DataType::JsonbArray(Box::new(DataType::Integer)));
    assert!(issues.is_empty());
}

#[test]
fn test_array_override_keeps_item_inference() {
    let (data_type, _) = infer(json!({
        "type": "array",
        "x-fqm-data-type": "arrayType",
        "items": { "type": "string", "format": "uuid" }
    }));
    assert_eq!(data_type, DataType::Array(Box::new(DataType::RangedUuid)));
}

#[test]
fn test_array_without_items() {
    let (data_type, issues) = infer(json!({ "type": "array" }));
    assert_eq!(data_type, DataType::JsonbArray(Box::new(DataType::String)));
    assert_eq!(issues, vec!["Array type with unknown item type; defaulting to string"]);
}

#[test]
fn test_array_item_issues_are_prefixed() {
    let (_, issues) = infer(json!({ "type": "array", "items": { "type": "null" } }));
    assert_eq!(issues, vec!["in array: Unknown type: null"]);
}

#[test]
fn test_array_item_extensions_are_checked() {
    let (data_type, issues) = infer(json!({
        "type": "array",
        "items": { "type": "integer", "x-fqm-bogus": true, "x-fqm-data-type": "numberType" }
    }));
    assert_eq!(data_type, DataType::JsonbArray(Box::new(DataType::Number)));
    assert_eq!(
        issues,
        vec!["Invalid custom properties found for array items: x-fqm-bogus"]
    );
}

#[test]
fn test_object_properties_become_fields() {
    let (data_type, issues) = infer(json!({
        "type": "object",
        "properties": {
            "createdDate": { "type": "string", "format": "date-time" },
            "createdByUserId": { "type": "string", "format": "uuid" },
            "hidden": { "type": "string", "x-fqm-ignore": true }
        }
    }));
    assert!(issues.is_empty());

    let properties = data_type.properties().unwrap();
    let names: Vec<_> = properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["created_date", "created_by_user_id"]);
    assert_eq!(properties[1].data_type, DataType::RangedUuid);
}

#[test]
fn test_non_boolean_ignore_keeps_property() {
    let (data_type, issues) = infer(json!({
        "type": "object",
        "properties": { "flag": { "type": "string", "x-fqm-ignore": "yes" } }
    }));
    assert_eq!(data_type.properties().unwrap().len(), 1);
    assert_eq!(
        issues,
        vec!["in object property flag: Invalid value for x-fqm-ignore in property flag: expected a boolean, got \"yes\""]
    );
}

#[test]
fn test_object_property_issues_are_prefixed() {
    let (_, issues) = infer(json!({
        "type": "object",
        "properties": {
            "weird": { "type": "null" },
            "virtual": { "folio:isVirtual": true }
        }
    }));
    assert_eq!(issues.len(), 3);
    assert_eq!(issues[0], "in object property weird: Unknown type: null");
    assert!(issues[1].starts_with("in object property virtual: It looks like this is a virtual property"));
    assert_eq!(issues[2], "in object property virtual: unable to generate field");
}

#[test]
fn test_deep_nesting_is_bounded() {
    let mut schema = json!({ "type": "integer" });
    for _ in 0..(MAX_SCHEMA_DEPTH * 2) {
        schema = json!({ "type": "array", "items": schema });
    }

    let (data_type, issues) = infer(schema);

    let mut depth = 0;
    let mut current = &data_type;
    while let Some(item) = current.item() {
        current = item;
        depth += 1;
    }
    assert_eq!(*current, DataType::String);
    assert!(depth <= MAX_SCHEMA_DEPTH + 1);
    assert_eq!(issues.len(), 1);
    assert!(issues[0].ends_with("treating as string"));
}
