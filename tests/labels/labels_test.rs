use entype::diagnostics::IssueKind;
use entype::labels::{
    infer_entity_labels, infer_field_labels, missing_labels, reconcile_external_labels, LabelMap,
    EXPECTED_LOCALES,
};
use entype::model::{DataType, EntityType, Field};
use std::collections::HashSet;
use uuid::Uuid;

fn entity(columns: Vec<Field>) -> EntityType {
    EntityType {
        id: Uuid::nil(),
        name: "mod_users__simple_department".to_string(),
        private: false,
        sources: vec![],
        required_permissions: vec![],
        default_sort: vec![],
        columns,
    }
}

fn labels(pairs: &[(&str, &str)]) -> LabelMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Inference
// ============================================================================

#[test]
fn test_entity_labels() {
    let et = entity(vec![
        Field::new("dept_id", DataType::RangedUuid),
        Field::new("jsonb", DataType::String),
        Field::new("metadata_created_date", DataType::Date),
    ]);

    let inferred = infer_entity_labels(&et);

    assert_eq!(
        inferred,
        labels(&[
            ("entityType.mod_users__simple_department", "Simple department"),
            ("entityType.mod_users__simple_department.dept_id", "Dept UUID"),
            ("entityType.mod_users__simple_department.jsonb", "JSONB"),
            ("entityType.mod_users__simple_department.metadata_created_date", "Created date"),
        ])
    );
}

#[test]
fn test_id_word_is_replaced_once_for_uuids_only() {
    let uuid = infer_field_labels(&Field::new("id", DataType::RangedUuid), "e");
    assert_eq!(uuid["entityType.e.id"], "UUID");

    let string = infer_field_labels(&Field::new("legacy_id", DataType::String), "e");
    assert_eq!(string["entityType.e.legacy_id"], "Legacy id");
}

#[test]
fn test_array_labels_match_bare_item_labels() {
    let item = DataType::Object(vec![
        Field::new("city", DataType::String),
        Field::new("zip", DataType::Integer),
    ]);
    let bare = Field::new("addresses", item.clone());
    let array = Field::new("addresses", DataType::Array(Box::new(item.clone())));
    let jsonb_array = Field::new("addresses", DataType::JsonbArray(Box::new(item)));

    let bare: HashSet<_> = infer_field_labels(&bare, "e").into_keys().collect();
    let array: HashSet<_> = infer_field_labels(&array, "e").into_keys().collect();
    let jsonb_array: HashSet<_> = infer_field_labels(&jsonb_array, "e").into_keys().collect();

    assert_eq!(bare, array);
    assert_eq!(bare, jsonb_array);
    assert!(bare.contains("entityType.e.addresses.city._qualified"));
    assert!(bare.contains("entityType.e.addresses.zip"));
}

#[test]
fn test_nested_objects_qualify_with_parent_name() {
    let inner = DataType::Object(vec![Field::new("street_name", DataType::String)]);
    let outer = Field::new(
        "home",
        DataType::JsonbArray(Box::new(DataType::Object(vec![Field::new("address", inner)]))),
    );

    let inferred = infer_field_labels(&outer, "e");

    assert_eq!(inferred["entityType.e.home.address"], "Address");
    assert_eq!(inferred["entityType.e.home.address._qualified"], "Home address");
    assert_eq!(inferred["entityType.e.home.address.street_name"], "Street name");
    assert_eq!(
        inferred["entityType.e.home.address.street_name._qualified"],
        "Address street name"
    );
}

// ============================================================================
// External Labels
// ============================================================================

#[test]
fn test_external_labels_are_rekeyed() {
    let et = entity(vec![Field::new("dept_id", DataType::RangedUuid)]);
    let expected: HashSet<String> = infer_entity_labels(&et).into_keys().collect();
    let external = labels(&[
        ("fqm.entityType.simple_department", "Departments"),
        ("fqm.entityType.simple_department.dept_id", "Department"),
        ("ui-users.permission.view", "View users"),
    ]);

    let (provided, extra) = reconcile_external_labels(&external, "mod-users", &expected);

    assert!(extra.is_none());
    assert_eq!(
        provided,
        labels(&[
            ("entityType.mod_users__simple_department", "Departments"),
            ("entityType.mod_users__simple_department.dept_id", "Department"),
        ])
    );
    assert!(missing_labels(&infer_entity_labels(&et), &provided).is_none());
}

#[test]
fn test_unexpected_external_labels_are_reported() {
    let et = entity(vec![Field::new("dept_id", DataType::RangedUuid)]);
    let expected: HashSet<String> = infer_entity_labels(&et).into_keys().collect();
    let external = labels(&[
        ("fqm.entityType.simple_department.gone", "Gone"),
        ("fqm.entityType.other_entity", "Other"),
        ("fqm.somethingElse", "Else"),
    ]);

    let (provided, extra) = reconcile_external_labels(&external, "mod-users", &expected);

    assert!(provided.is_empty());
    let extra = extra.unwrap();
    assert!(!extra.is_error());
    assert_eq!(
        extra.kind,
        IssueKind::LabelsExtra {
            keys: vec![
                "fqm.entityType.simple_department.gone".to_string(),
                "fqm.entityType.other_entity".to_string(),
                "fqm.somethingElse".to_string(),
            ]
        }
    );
}

#[test]
fn test_missing_labels_lists_keys() {
    let et = entity(vec![Field::new("dept_id", DataType::RangedUuid)]);
    let inferred = infer_entity_labels(&et);

    let issue = missing_labels(&inferred, &LabelMap::new()).unwrap();

    assert_eq!(
        issue.message,
        "2 translations missing: entityType.mod_users__simple_department, entityType.mod_users__simple_department.dept_id"
    );
}

#[test]
fn test_expected_locales_include_english() {
    assert!(EXPECTED_LOCALES.contains(&"en"));
    assert!(EXPECTED_LOCALES.contains(&"pt_BR"));
}
