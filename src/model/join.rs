//! Join references between entity types.
//!
//! A join starts life as an [`IntermediateJoin`] that names its target by
//! module and entity. Once the whole batch is compiled the join resolver
//! replaces it with a [`ResolvedJoin`] pointing at the target's stable id.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// SQL join direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinDirection {
    Inner,
    Left,
    Right,
    Full,
}

/// How the join condition is built by the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum JoinCondition {
    /// `source = target`
    EqualitySimple,
    /// `source::uuid = target::uuid`
    EqualityCastUuid,
    /// Arbitrary SQL with `:this` / `:that` placeholders.
    Custom { sql: String },
}

impl JoinCondition {
    pub fn tag(&self) -> &'static str {
        match self {
            JoinCondition::EqualitySimple => "equality-simple",
            JoinCondition::EqualityCastUuid => "equality-cast-uuid",
            JoinCondition::Custom { .. } => "custom",
        }
    }
}

// ============================================================================
// Intermediate Joins
// ============================================================================

/// A join to another entity type, addressed by name.
///
/// Only meaningful while a batch is being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JoinSpec", into = "JoinSpec")]
pub struct IntermediateJoin {
    pub target_module: String,
    pub target_entity: String,
    pub target_field: String,
    pub direction: Option<JoinDirection>,
    /// Explicit condition; inferred from the source field type when absent.
    pub condition: Option<JoinCondition>,
}

impl IntermediateJoin {
    pub fn new(
        target_module: impl Into<String>,
        target_entity: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            target_module: target_module.into(),
            target_entity: target_entity.into(),
            target_field: target_field.into(),
            direction: None,
            condition: None,
        }
    }

    pub fn with_direction(mut self, direction: JoinDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_condition(mut self, condition: JoinCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// `<targetModule>__<targetEntity>`, as written in messages.
    pub fn target_label(&self) -> String {
        format!("{}__{}", self.target_module, self.target_entity)
    }
}

/// Flat wire shape of a join spec (`x-fqm-joins-to` entries).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct JoinSpec {
    target_module: String,
    target_entity: String,
    target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    direction: Option<JoinDirection>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sql: Option<String>,
}

/// Reasons a join spec cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinSpecError {
    UnknownType(String),
    MissingSql,
}

impl fmt::Display for JoinSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinSpecError::UnknownType(kind) => write!(
                f,
                "invalid join type '{}'; expected one of equality-simple, equality-cast-uuid, custom",
                kind
            ),
            JoinSpecError::MissingSql => write!(f, "custom joins require a sql condition"),
        }
    }
}

impl std::error::Error for JoinSpecError {}

impl TryFrom<JoinSpec> for IntermediateJoin {
    type Error = JoinSpecError;

    fn try_from(spec: JoinSpec) -> Result<Self, Self::Error> {
        let condition = match spec.kind.as_deref() {
            None => None,
            Some("equality-simple") => Some(JoinCondition::EqualitySimple),
            Some("equality-cast-uuid") => Some(JoinCondition::EqualityCastUuid),
            Some("custom") => Some(JoinCondition::Custom {
                sql: spec.sql.clone().ok_or(JoinSpecError::MissingSql)?,
            }),
            Some(other) => return Err(JoinSpecError::UnknownType(other.to_string())),
        };

        Ok(IntermediateJoin {
            target_module: spec.target_module,
            target_entity: spec.target_entity,
            target_field: spec.target_field,
            direction: spec.direction,
            condition,
        })
    }
}

impl From<IntermediateJoin> for JoinSpec {
    fn from(join: IntermediateJoin) -> Self {
        let (kind, sql) = match join.condition {
            None => (None, None),
            Some(JoinCondition::Custom { sql }) => (Some("custom".to_string()), Some(sql)),
            Some(other) => (Some(other.tag().to_string()), None),
        };
        JoinSpec {
            target_module: join.target_module,
            target_entity: join.target_entity,
            target_field: join.target_field,
            direction: join.direction,
            kind,
            sql,
        }
    }
}

// ============================================================================
// Resolved Joins
// ============================================================================

/// A join whose target has been collapsed to a stable entity type id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedJoin {
    pub target_id: Uuid,
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<JoinDirection>,
    #[serde(flatten)]
    pub condition: JoinCondition,
}
