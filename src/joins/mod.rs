//! Batch-wide join resolution.
//!
//! Joins name their target by module and entity, which may be compiled later
//! in the same batch. Resolution therefore runs once the whole batch is
//! assembled, in two passes:
//!
//! 1. Build an immutable index of every entity type (`name → id, columns`).
//! 2. Rewrite each field's intermediate joins into resolved joins.
//!
//! Intermediate joins are always discarded, resolved or not, including those
//! on properties nested inside object and array item types.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::mem;
use uuid::Uuid;

use crate::diagnostics::{Diagnostic, Issue, IssueKind, JoinMissing, Severity};
use crate::inflection::disambiguate_name;
use crate::model::{DataType, EntityType, Field, IntermediateJoin, JoinCondition, ResolvedJoin};

/// Target id used for joins to missing entity types in force mode.
pub const PLACEHOLDER_TARGET_ID: Uuid = Uuid::from_u128(0xdeadbeef_dead_beef_dead_beefdeadbeef);

// ============================================================================
// Index
// ============================================================================

struct IndexedEntity {
    id: Uuid,
    columns: HashSet<String>,
}

/// Immutable lookup of the batch's entity types by disambiguated name.
pub struct EntityIndex {
    entities: HashMap<String, IndexedEntity>,
}

impl EntityIndex {
    pub fn build(entity_types: &[EntityType]) -> Self {
        let entities = entity_types
            .iter()
            .map(|et| {
                let indexed = IndexedEntity {
                    id: et.id,
                    columns: et.columns.iter().map(|c| c.name.clone()).collect(),
                };
                (et.name.clone(), indexed)
            })
            .collect();
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn get(&self, join: &IntermediateJoin) -> Option<&IndexedEntity> {
        self.entities
            .get(&disambiguate_name(&join.target_module, &join.target_entity))
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the intermediate joins of every entity type in the batch.
///
/// Returns the issues found, attributed to the entity type owning the join.
/// A missing target entity is an error, or a warning with a placeholder
/// target when `force` is set. A missing target field is always an error.
pub fn resolve_joins(entity_types: &mut [EntityType], force: bool) -> Vec<Diagnostic> {
    let index = EntityIndex::build(entity_types);
    debug!("Resolving joins against {} entity types", index.len());

    let mut diagnostics = Vec::new();
    for entity_type in entity_types.iter_mut() {
        let mut issues = Vec::new();
        for field in entity_type.columns.iter_mut() {
            resolve_nested_joins(&index, &entity_type.name, field, force, &mut issues);
        }
        diagnostics.extend(
            issues
                .into_iter()
                .map(|issue| Diagnostic::new(issue).for_entity(entity_type.name.clone())),
        );
    }
    diagnostics
}

/// Resolve a field's joins and those of every property below it, through
/// object properties and array items at any depth.
fn resolve_nested_joins(
    index: &EntityIndex,
    entity_name: &str,
    field: &mut Field,
    force: bool,
    issues: &mut Vec<Issue>,
) {
    issues.extend(resolve_field_joins(index, entity_name, field, force));
    resolve_type_joins(index, entity_name, &mut field.data_type, force, issues);
}

fn resolve_type_joins(
    index: &EntityIndex,
    entity_name: &str,
    data_type: &mut DataType,
    force: bool,
    issues: &mut Vec<Issue>,
) {
    match data_type {
        DataType::Array(item) | DataType::JsonbArray(item) => {
            resolve_type_joins(index, entity_name, item, force, issues)
        }
        DataType::Object(properties) => {
            for property in properties.iter_mut() {
                resolve_nested_joins(index, entity_name, property, force, issues);
            }
        }
        _ => {}
    }
}

fn resolve_field_joins(
    index: &EntityIndex,
    entity_name: &str,
    field: &mut Field,
    force: bool,
) -> Vec<Issue> {
    let intermediate = mem::take(&mut field.joins_to_intermediate);
    if intermediate.is_empty() {
        return Vec::new();
    }

    let mut issues = Vec::new();
    let mut resolved = field.joins_to.take().unwrap_or_default();

    for join in intermediate {
        let target_id = match index.get(&join) {
            Some(target) if target.columns.contains(&join.target_field) => target.id,
            Some(_) => {
                issues.push(join_issue(
                    Severity::Error,
                    entity_name,
                    field,
                    &join,
                    JoinMissing::Field,
                ));
                continue;
            }
            None if force => {
                issues.push(join_issue(
                    Severity::Warning,
                    entity_name,
                    field,
                    &join,
                    JoinMissing::Entity,
                ));
                PLACEHOLDER_TARGET_ID
            }
            None => {
                issues.push(join_issue(
                    Severity::Error,
                    entity_name,
                    field,
                    &join,
                    JoinMissing::Entity,
                ));
                continue;
            }
        };

        let condition = join
            .condition
            .unwrap_or_else(|| default_condition(&field.data_type));
        resolved.push(ResolvedJoin {
            target_id,
            target_field: join.target_field,
            direction: join.direction,
            condition,
        });
    }

    field.joins_to = (!resolved.is_empty()).then_some(resolved);
    issues
}

/// Join condition for joins without an explicit type.
pub fn default_condition(source_type: &DataType) -> JoinCondition {
    match source_type {
        DataType::RangedUuid => JoinCondition::EqualityCastUuid,
        _ => JoinCondition::EqualitySimple,
    }
}

fn join_issue(
    severity: Severity,
    entity_name: &str,
    field: &Field,
    join: &IntermediateJoin,
    missing: JoinMissing,
) -> Issue {
    let message = match missing {
        JoinMissing::Entity => format!(
            "Entity type {} field {} has a join to entity {}, but it does not exist.",
            entity_name,
            field.name,
            join.target_label()
        ),
        JoinMissing::Field => format!(
            "Entity type {} field {} has a join to field {} in entity {}, but no such field exists.",
            entity_name,
            field.name,
            join.target_field,
            join.target_label()
        ),
    };
    warn!("{}", message);

    Issue::new(
        severity,
        IssueKind::Join {
            field_name: field.name.clone(),
            target: join.target_label(),
            target_field: join.target_field.clone(),
            missing,
        },
        message,
    )
}
