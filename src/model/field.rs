// src/model/field.rs
use serde::{Deserialize, Serialize};

use super::data_type::DataType;
use super::join::{IntermediateJoin, ResolvedJoin};

/// One compiled column of an entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    /// Source alias the getters are written against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_id_column: Option<bool>,
    #[serde(default = "default_true")]
    pub queryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub visible_by_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_getter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_value_getter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_function: Option<String>,
    /// Enumerated values offered to the query builder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<ValueLabel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_source_api: Option<ValueSourceApi>,
    /// Column of another entity type this field's values come from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FieldSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joins_to: Option<Vec<ResolvedJoin>>,
    /// Unresolved joins; always empty once the batch is resolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins_to_intermediate: Vec<IntermediateJoin>,
}

fn default_true() -> bool {
    true
}

impl Field {
    /// A queryable, not-visible-by-default field with no getters.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            queryable: !data_type.is_object(),
            data_type,
            source_alias: None,
            is_id_column: None,
            query_only: None,
            hidden: None,
            visible_by_default: false,
            essential: None,
            value_getter: None,
            filter_value_getter: None,
            value_function: None,
            values: None,
            value_source_api: None,
            source: None,
            joins_to: None,
            joins_to_intermediate: Vec::new(),
        }
    }

    pub fn with_value_getter(mut self, getter: impl Into<String>) -> Self {
        self.value_getter = Some(getter.into());
        self
    }

    pub fn with_queryable(mut self, queryable: bool) -> Self {
        self.queryable = queryable;
        self
    }

    pub fn with_intermediate_join(mut self, join: IntermediateJoin) -> Self {
        self.joins_to_intermediate.push(join);
        self
    }

    pub fn is_id_column(&self) -> bool {
        self.is_id_column.unwrap_or(false)
    }
}

/// A value/label pair for enumerated fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueLabel {
    pub value: String,
    pub label: String,
}

impl ValueLabel {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// An API the query builder can call to list a field's possible values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSourceApi {
    pub path: String,
    pub value_json_path: String,
    pub label_json_path: String,
}

/// Points a field at a column of another entity type for value lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSource {
    pub column_name: String,
    pub entity_type_id: String,
}
