use entype::assembly::{assemble_entity_type, entity_type_id};
use entype::config::ModuleConfig;
use entype::diagnostics::{IssueKind, JoinMissing, Severity};
use entype::joins::{default_condition, resolve_joins, EntityIndex, PLACEHOLDER_TARGET_ID};
use entype::model::{DataType, DataTypeValue, EntityType, JoinCondition};
use serde_json::{json, Value};

fn config(module: &str, resource: &str) -> ModuleConfig {
    ModuleConfig::from_toml_str(&format!(
        r#"
        [metadata]
        team = "corsair"
        domain = "users"
        module = "{module}"

        [[sources]]
        name = "src"
        table = "things"

        [[entityTypes]]
        name = "{resource}"
        source = "src"
        schema = "schema.json"
        permissions = []
        sort = ["id", "ASC"]
        "#
    ))
    .unwrap()
}

fn compile(module: &str, resource: &str, schema: Value) -> EntityType {
    let config = config(module, resource);
    assemble_entity_type(&config.entity_types[0], &schema, &config)
        .unwrap()
        .entity_type
}

fn joining(target_module: &str, target_entity: &str, target_field: &str) -> EntityType {
    compile(
        "mod-source",
        "source_entity",
        json!({
            "type": "object",
            "properties": {
                "ref": {
                    "type": "string",
                    "format": "uuid",
                    "x-fqm-joins-to": [{
                        "targetModule": target_module,
                        "targetEntity": target_entity,
                        "targetField": target_field
                    }]
                }
            }
        }),
    )
}

fn user() -> EntityType {
    compile(
        "mod-users",
        "simple_user",
        json!({ "type": "object", "properties": { "id": { "type": "string", "format": "uuid" } } }),
    )
}

// ============================================================================
// Missing Targets
// ============================================================================

#[test]
fn test_missing_entity_default_mode() {
    let mut batch = vec![joining("bad", "worse", "x")];

    let diagnostics = resolve_joins(&mut batch, false);

    assert!(batch[0].column("ref").unwrap().joins_to.is_none());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity(), Severity::Error);
    assert_eq!(
        diagnostics[0].issue.message,
        "Entity type mod_source__source_entity field ref has a join to entity bad__worse, but it does not exist."
    );
    assert_eq!(
        diagnostics[0].issue.kind,
        IssueKind::Join {
            field_name: "ref".to_string(),
            target: "bad__worse".to_string(),
            target_field: "x".to_string(),
            missing: JoinMissing::Entity,
        }
    );
    assert_eq!(
        diagnostics[0].entity_type_name.as_deref(),
        Some("mod_source__source_entity")
    );
}

#[test]
fn test_missing_entity_force_mode() {
    let mut batch = vec![joining("bad", "worse", "x")];

    let diagnostics = resolve_joins(&mut batch, true);

    let joins = batch[0].column("ref").unwrap().joins_to.as_ref().unwrap();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].target_id, PLACEHOLDER_TARGET_ID);
    assert_eq!(joins[0].target_field, "x");
    assert_eq!(joins[0].condition, JoinCondition::EqualityCastUuid);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity(), Severity::Warning);
}

#[test]
fn test_placeholder_id() {
    assert_eq!(
        PLACEHOLDER_TARGET_ID.to_string(),
        "deadbeef-dead-beef-dead-beefdeadbeef"
    );
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_resolves_across_modules_in_any_order() {
    let mut forward = vec![joining("mod-users", "simple_user", "id"), user()];
    let mut backward = vec![user(), joining("mod-users", "simple_user", "id")];

    assert!(resolve_joins(&mut forward, false).is_empty());
    assert!(resolve_joins(&mut backward, false).is_empty());

    let expected = entity_type_id("mod-users", "simple_user");
    let forward_joins = forward[0].column("ref").unwrap().joins_to.clone().unwrap();
    let backward_joins = backward[1].column("ref").unwrap().joins_to.clone().unwrap();
    assert_eq!(forward_joins[0].target_id, expected);
    assert_eq!(forward_joins, backward_joins);
}

#[test]
fn test_intermediate_joins_never_survive() {
    let mut batch = vec![
        joining("mod-users", "simple_user", "id"),
        joining("mod-users", "simple_user", "nope"),
        joining("bad", "worse", "x"),
        user(),
    ];

    let diagnostics = resolve_joins(&mut batch, false);

    assert_eq!(diagnostics.len(), 2);
    for entity_type in &batch {
        for column in &entity_type.columns {
            assert!(column.joins_to_intermediate.is_empty());
        }
    }
    let serialized = serde_json::to_value(&batch[0]).unwrap();
    assert!(!serialized.to_string().contains("joinsToIntermediate"));
}

#[test]
fn test_missing_field_message() {
    let mut batch = vec![joining("mod-users", "simple_user", "nope"), user()];

    let diagnostics = resolve_joins(&mut batch, true);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity(), Severity::Error);
    assert_eq!(
        diagnostics[0].issue.message,
        "Entity type mod_source__source_entity field ref has a join to field nope in entity mod-users__simple_user, but no such field exists."
    );
}

#[test]
fn test_index_counts_entity_types() {
    let batch = vec![user()];
    let index = EntityIndex::build(&batch);
    assert_eq!(index.len(), 1);
    assert!(!index.is_empty());
}

#[test]
fn test_default_condition_is_total() {
    for tag in DataTypeValue::ALL {
        let data_type = tag.leaf().unwrap_or(DataType::String);
        let condition = default_condition(&data_type);
        let expected = if tag == DataTypeValue::RangedUuid {
            JoinCondition::EqualityCastUuid
        } else {
            JoinCondition::EqualitySimple
        };
        assert_eq!(condition, expected, "tag {}", tag);
    }
}
