//! Read-only view over a JSON Schema node.
//!
//! Schemas arrive fully dereferenced as `serde_json::Value`s. [`SchemaNode`]
//! exposes the handful of keywords the compiler understands; `x-fqm-`
//! extension keys are parsed into typed [`Extensions`] by the field
//! synthesizer.

mod extensions;

pub use extensions::{
    unknown_extensions, Extensions, Override, Visibility, ALLOWED_EXTENSIONS, EXTENSION_PREFIX,
};

use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::model::DataTypeValue;

/// Key marking a property computed at runtime rather than stored.
pub const VIRTUAL_HINT: &str = "folio:isVirtual";
/// Key overriding the inferred data type.
pub const DATA_TYPE_OVERRIDE: &str = "x-fqm-data-type";

static EMPTY: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// A borrowed schema node.
///
/// Boolean schemas and other non-object values behave like an empty schema.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> SchemaNode<'a> {
    pub fn new(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self { map },
            _ => Self { map: &EMPTY },
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// The `type` keyword; union types are joined with commas
    /// (`["string", "null"]` → `"string,null"`).
    pub fn type_keyword(&self) -> Option<String> {
        match self.map.get("type")? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => Some(other.to_string()),
        }
    }

    fn str_keyword(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).and_then(Value::as_str)
    }

    pub fn format(&self) -> Option<&'a str> {
        self.str_keyword("format")
    }

    pub fn pattern(&self) -> Option<&'a str> {
        self.str_keyword("pattern")
    }

    /// The `$ref` pointer, when the node is an (unresolved) reference.
    pub fn reference(&self) -> Option<&'a str> {
        self.str_keyword("$ref")
    }

    pub fn items(&self) -> Option<SchemaNode<'a>> {
        self.map.get("items").map(SchemaNode::new)
    }

    /// Declared properties in declaration order, if the keyword is present.
    pub fn properties(&self) -> Option<Vec<(&'a str, SchemaNode<'a>)>> {
        let properties = self.map.get("properties")?.as_object()?;
        Some(
            properties
                .iter()
                .map(|(key, value)| (key.as_str(), SchemaNode::new(value)))
                .collect(),
        )
    }

    /// `enum` values rendered as strings.
    pub fn enum_values(&self) -> Option<Vec<String>> {
        let values = self.map.get("enum")?.as_array()?;
        Some(
            values
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )
    }

    pub fn is_virtual(&self) -> bool {
        self.map.get(VIRTUAL_HINT).and_then(Value::as_bool) == Some(true)
    }

    /// `x-fqm-ignore`; `Err` carries a non-boolean value.
    pub fn ignore(&self) -> Option<Result<bool, &'a Value>> {
        let value = self.map.get("x-fqm-ignore")?;
        Some(value.as_bool().ok_or(value))
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self.ignore(), Some(Ok(true)))
    }

    /// The data type override; `Err` carries an unrecognized tag.
    pub fn data_type_override(&self) -> Option<Result<DataTypeValue, String>> {
        let value = self.map.get(DATA_TYPE_OVERRIDE)?;
        Some(match value.as_str() {
            Some(tag) => tag.parse(),
            None => Err(value.to_string()),
        })
    }

    /// All `x-fqm-` keys present on the node.
    pub fn extension_keys(&self) -> impl Iterator<Item = &'a str> {
        self.map
            .keys()
            .map(String::as_str)
            .filter(|k| k.starts_with(EXTENSION_PREFIX))
    }
}
