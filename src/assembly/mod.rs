//! Entity type assembly.
//!
//! Turns one resource's schema and configuration into an [`EntityType`]:
//!
//! ```text
//! root properties ──▶ infer_field ──▶ + jsonb ──▶ flatten ──▶ array-of-object rule
//!                                                                   │
//!            EntityType ◀── exclusions ◀── overrides ◀── additions ◀┘
//! ```
//!
//! Joins are left unresolved here; they need the whole batch.

mod flatten;

pub use flatten::{flatten_object_columns, mark_nested_array_objects_non_queryable};

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use uuid::Uuid;

use crate::compile::CompileError;
use crate::config::{resolve_source, EntityTypeConfig, ModuleConfig};
use crate::diagnostics::{Issue, IssueKind, Severity};
use crate::inference::{infer_field, InferenceContext};
use crate::inflection::disambiguate_name;
use crate::model::{DataType, EntityType, Field, SortSpec, ENTITY_TYPE_NAMESPACE};
use crate::schema::SchemaNode;

/// Name of the raw document column.
pub const JSONB_FIELD: &str = "jsonb";

/// An assembled entity type and the issues found along the way.
#[derive(Debug, Clone)]
pub struct AssembledEntity {
    pub entity_type: EntityType,
    pub issues: Vec<Issue>,
}

/// Stable id of a resource: UUID v5 of `<module>/<resource>`.
pub fn entity_type_id(module: &str, resource: &str) -> Uuid {
    Uuid::new_v5(
        &ENTITY_TYPE_NAMESPACE,
        format!("{}/{}", module, resource).as_bytes(),
    )
}

/// Assemble the entity type for one resource of `module`.
///
/// # Errors
///
/// Fails if the root schema is not an object with declared properties, if
/// the source cannot be resolved, or if a property has an invalid
/// visibility class.
pub fn assemble_entity_type(
    entity: &EntityTypeConfig,
    schema: &Value,
    module: &ModuleConfig,
) -> Result<AssembledEntity, CompileError> {
    let root = SchemaNode::new(schema);
    let properties = match (root.type_keyword().as_deref(), root.properties()) {
        (Some("object"), Some(properties)) => properties,
        _ => {
            return Err(CompileError::InvalidRootSchema {
                schema: entity.schema.clone(),
            })
        }
    };

    let source = resolve_source(&entity.source, &module.sources, &module.source_map)?;
    let ctx = InferenceContext::new(source.alias.clone(), module.schema_prefix())
        .with_legacy_index_style(entity.legacy_index_style);

    let mut issues = Vec::new();
    let mut columns = Vec::with_capacity(properties.len() + 1);
    for (property, node) in properties {
        let outcome = infer_field(property, node, &ctx)?;
        issues.extend(outcome.issues.into_iter().map(Issue::schema));
        columns.extend(outcome.field);
    }

    if entity.includes_jsonb_field() {
        columns.push(jsonb_field(&source.alias));
    }

    let mut columns = flatten_object_columns(columns);
    mark_nested_array_objects_non_queryable(&mut columns);
    apply_field_additions(&mut columns, &entity.field_additions);
    issues.extend(apply_field_overrides(&mut columns, &entity.field_overrides));
    issues.extend(apply_field_exclusions(&mut columns, &entity.field_exclusions));

    let entity_type = EntityType {
        id: entity_type_id(&module.metadata.module, &entity.name),
        name: disambiguate_name(&module.metadata.module, &entity.name),
        private: entity.private,
        sources: vec![source],
        required_permissions: entity.permissions.clone(),
        default_sort: vec![SortSpec::from(entity.sort.clone())],
        columns,
    };

    debug!(
        "Assembled {} with {} columns and {} issues",
        entity_type.name,
        entity_type.columns.len(),
        issues.len()
    );

    Ok(AssembledEntity {
        entity_type,
        issues,
    })
}

/// The raw document column, `:<alias>.jsonb::text`.
pub fn jsonb_field(alias: &str) -> Field {
    Field::new(JSONB_FIELD, DataType::String)
        .with_queryable(false)
        .with_value_getter(format!(":{}.jsonb::text", alias))
}

/// Replace columns with the same name as an addition, append the rest.
pub fn apply_field_additions(columns: &mut Vec<Field>, additions: &[Field]) {
    for addition in additions {
        match columns.iter_mut().find(|c| c.name == addition.name) {
            Some(existing) => *existing = addition.clone(),
            None => columns.push(addition.clone()),
        }
    }
}

/// Merge partial field JSON over the named columns, key by key.
pub fn apply_field_overrides(columns: &mut [Field], overrides: &IndexMap<String, Value>) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (name, patch) in overrides {
        let Some(column) = columns.iter_mut().find(|c| c.name == *name) else {
            issues.push(config_issue(format!(
                "Field override for {} does not match any field",
                name
            )));
            continue;
        };
        let Value::Object(patch) = patch else {
            issues.push(config_issue(format!(
                "Field override for {} must be a table of field properties",
                name
            )));
            continue;
        };

        let merged = match serde_json::to_value(&*column) {
            Ok(Value::Object(mut current)) => {
                for (key, value) in patch {
                    current.insert(key.clone(), value.clone());
                }
                Value::Object(current)
            }
            Ok(_) => continue,
            Err(e) => {
                issues.push(config_issue(format!("Unable to override field {}: {}", name, e)));
                continue;
            }
        };

        match serde_json::from_value::<Field>(merged) {
            Ok(field) => *column = field,
            Err(e) => issues.push(config_issue(format!("Invalid override for field {}: {}", name, e))),
        }
    }

    issues
}

/// Remove the named columns.
pub fn apply_field_exclusions(columns: &mut Vec<Field>, exclusions: &[String]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for name in exclusions {
        let before = columns.len();
        columns.retain(|c| c.name != *name);
        if columns.len() == before {
            issues.push(config_issue(format!(
                "Field exclusion {} does not match any field",
                name
            )));
        }
    }

    issues
}

fn config_issue(message: String) -> Issue {
    Issue::new(Severity::Warning, IssueKind::Config, message)
}
