// src/model/entity_type.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::Field;

/// Namespace for entity type ids, so a resource keeps its id across runs.
pub const ENTITY_TYPE_NAMESPACE: Uuid = Uuid::from_u128(0xdac5ff9d_28e2_4ce8_b498_958f5d2ad3da);

/// One compiled resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    pub id: Uuid,
    /// `<snake_cased_module>__<resource>`
    pub name: String,
    #[serde(default)]
    pub private: bool,
    pub sources: Vec<EntitySource>,
    pub required_permissions: Vec<String>,
    pub default_sort: Vec<SortSpec>,
    pub columns: Vec<Field>,
}

impl EntityType {
    pub fn column(&self, name: &str) -> Option<&Field> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The resource part of the name (after the module prefix).
    pub fn resource_name(&self) -> &str {
        self.name
            .rsplit_once("__")
            .map(|(_, resource)| resource)
            .unwrap_or(&self.name)
    }
}

/// Kind of source backing an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Db,
    EntityType,
}

/// A source an entity type reads from, referenced by alias in getters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Default sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub column_name: String,
    pub direction: String,
}

impl From<(String, String)> for SortSpec {
    fn from((column_name, direction): (String, String)) -> Self {
        Self {
            column_name,
            direction,
        }
    }
}
