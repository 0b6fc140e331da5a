//! Typed `x-fqm-` extension keys.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::SchemaNode;
use crate::compile::CompileError;
use crate::model::{FieldSource, IntermediateJoin, ResolvedJoin, ValueLabel, ValueSourceApi};

pub const EXTENSION_PREFIX: &str = "x-fqm-";

/// Extension keys a property schema may carry.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "x-fqm-name",
    "x-fqm-ignore",
    "x-fqm-data-type",
    "x-fqm-value-getter",
    "x-fqm-filter-value-getter",
    "x-fqm-value-function",
    "x-fqm-is-id-column",
    "x-fqm-value-source-api",
    "x-fqm-values",
    "x-fqm-visible-by-default",
    "x-fqm-visibility",
    "x-fqm-essential",
    "x-fqm-joins-to",
    "x-fqm-joins-to-raw",
    "x-fqm-source",
];

/// A tri-state override: leave the inferred value, delete it, or replace it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Override<T> {
    #[default]
    Keep,
    Remove,
    Replace(T),
}

impl<T> Override<T> {
    pub fn is_set(&self) -> bool {
        !matches!(self, Override::Keep)
    }

    /// Apply this override on top of an inferred value.
    pub fn apply(self, inferred: Option<T>) -> Option<T> {
        match self {
            Override::Keep => inferred,
            Override::Remove => None,
            Override::Replace(value) => Some(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Override<U> {
        match self {
            Override::Keep => Override::Keep,
            Override::Remove => Override::Remove,
            Override::Replace(value) => Override::Replace(f(value)),
        }
    }
}

/// Visibility class of a field (`x-fqm-visibility`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Queryable and shown in results.
    All,
    /// Usable in queries only.
    QueryOnly,
    /// Shown in results only.
    ResultsOnly,
    Hidden,
}

impl Visibility {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Visibility::All),
            "query-only" => Some(Visibility::QueryOnly),
            "results-only" => Some(Visibility::ResultsOnly),
            "hidden" => Some(Visibility::Hidden),
            _ => None,
        }
    }
}

/// Typed view of all extension keys on one property schema.
#[derive(Debug, Clone, Default)]
pub struct Extensions {
    pub name: Option<String>,
    pub value_getter: Override<String>,
    pub filter_value_getter: Override<String>,
    pub value_function: Override<String>,
    pub is_id_column: Option<bool>,
    pub value_source_api: Option<ValueSourceApi>,
    pub values: Option<Vec<ValueLabel>>,
    pub visible_by_default: Option<bool>,
    pub visibility: Option<Visibility>,
    pub essential: Option<bool>,
    pub joins_to: Vec<IntermediateJoin>,
    pub joins_to_raw: Option<Vec<ResolvedJoin>>,
    pub source: Option<FieldSource>,
}

impl Extensions {
    /// Parse and validate the extension keys of `node`.
    ///
    /// Unknown keys and malformed values are reported as issues and ignored.
    /// An unrecognized visibility class is fatal.
    pub fn parse(property: &str, node: SchemaNode<'_>) -> Result<(Self, Vec<String>), CompileError> {
        let mut issues: Vec<String> =
            unknown_extensions(&format!("property {}", property), node).into_iter().collect();

        if let Some(Err(value)) = node.ignore() {
            issues.push(format!(
                "Invalid value for x-fqm-ignore in property {}: expected a boolean, got {}",
                property, value
            ));
        }

        let visibility = match node.get("x-fqm-visibility") {
            None => None,
            Some(value) => {
                let parsed = value.as_str().and_then(Visibility::from_str);
                match parsed {
                    Some(visibility) => Some(visibility),
                    None => {
                        return Err(CompileError::InvalidVisibility {
                            property: property.to_string(),
                            value: value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()),
                        })
                    }
                }
            }
        };

        let joins_to = match node.get("x-fqm-joins-to") {
            None => Vec::new(),
            Some(value) => match serde_json::from_value::<Vec<IntermediateJoin>>(value.clone()) {
                Ok(joins) => joins,
                Err(e) => {
                    issues.push(format!("Error parsing x-fqm-joins-to: {}", e));
                    Vec::new()
                }
            },
        };

        let extensions = Extensions {
            name: typed(property, node, "x-fqm-name", &mut issues),
            value_getter: getter_override(property, node, "x-fqm-value-getter", &mut issues),
            filter_value_getter: getter_override(
                property,
                node,
                "x-fqm-filter-value-getter",
                &mut issues,
            ),
            value_function: getter_override(property, node, "x-fqm-value-function", &mut issues),
            is_id_column: typed(property, node, "x-fqm-is-id-column", &mut issues),
            value_source_api: typed(property, node, "x-fqm-value-source-api", &mut issues),
            values: typed(property, node, "x-fqm-values", &mut issues),
            visible_by_default: typed(property, node, "x-fqm-visible-by-default", &mut issues),
            visibility,
            essential: typed(property, node, "x-fqm-essential", &mut issues),
            joins_to,
            joins_to_raw: typed(property, node, "x-fqm-joins-to-raw", &mut issues),
            source: typed(property, node, "x-fqm-source", &mut issues),
        };

        Ok((extensions, issues))
    }

    /// True if any getter-related override is present.
    pub fn overrides_getters(&self) -> bool {
        self.value_getter.is_set() || self.filter_value_getter.is_set() || self.value_function.is_set()
    }
}

/// Report the `x-fqm-` keys of `node` outside [`ALLOWED_EXTENSIONS`].
///
/// `owner` names the node in the message, e.g. `property code`.
pub fn unknown_extensions(owner: &str, node: SchemaNode<'_>) -> Option<String> {
    let invalid: Vec<&str> = node
        .extension_keys()
        .filter(|key| !ALLOWED_EXTENSIONS.contains(key))
        .collect();
    (!invalid.is_empty()).then(|| {
        format!(
            "Invalid custom properties found for {}: {}",
            owner,
            invalid.join(", ")
        )
    })
}

fn typed<T: DeserializeOwned>(
    property: &str,
    node: SchemaNode<'_>,
    key: &str,
    issues: &mut Vec<String>,
) -> Option<T> {
    let value = node.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            issues.push(format!("Invalid value for {} in property {}: {}", key, property, e));
            None
        }
    }
}

fn getter_override(
    property: &str,
    node: SchemaNode<'_>,
    key: &str,
    issues: &mut Vec<String>,
) -> Override<String> {
    match node.get(key) {
        None => Override::Keep,
        Some(Value::Null) => Override::Remove,
        Some(Value::String(s)) => Override::Replace(s.clone()),
        Some(other) => {
            issues.push(format!(
                "Invalid value for {} in property {}: expected a string or null, got {}",
                key, property, other
            ));
            Override::Keep
        }
    }
}
