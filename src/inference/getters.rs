//! SQL getter synthesis.
//!
//! Every field carries up to three expressions evaluated by the query engine:
//!
//! - `valueGetter`: reads the value out of the source row's jsonb document
//! - `filterValueGetter`: the expression filters compare against
//! - `valueFunction`: applied to user-supplied values before comparison
//!
//! Expressions are written against `:<alias>`, which the engine replaces with
//! the real source alias.

use super::{InferenceContext, Scope};
use crate::model::DataType;
use crate::schema::Extensions;

/// Placeholder in getter overrides standing for the source alias.
pub const SOURCE_PLACEHOLDER: &str = "${source}";

/// The getter expressions of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Getters {
    pub value_getter: Option<String>,
    pub filter_value_getter: Option<String>,
    pub value_function: Option<String>,
}

/// Build the getters for `property`, located in the value at `ctx`.
///
/// Automatic getters depend on the data type and on whether the property
/// sits inside array elements. Explicit overrides replace (or, when `null`,
/// remove) each expression individually and disable legacy index style.
pub fn synthesize_getters(
    property: &str,
    data_type: &DataType,
    ctx: &InferenceContext,
    extensions: &Extensions,
) -> Getters {
    let legacy = ctx.legacy_index_style && !extensions.overrides_getters();

    let automatic = match &ctx.scope {
        Scope::Document { path } => {
            let base = format!("{}{}", ctx.document(), path);
            document_getters(&base, property, data_type, legacy.then_some(ctx.schema_prefix.as_str()))
        }
        Scope::ArrayElement { array, path } => element_getters(array, path, property, data_type),
    };

    let expand = |getter: String| getter.replace(SOURCE_PLACEHOLDER, &format!(":{}", ctx.source_alias));

    Getters {
        value_getter: extensions
            .value_getter
            .clone()
            .map(expand)
            .apply(automatic.value_getter),
        filter_value_getter: extensions
            .filter_value_getter
            .clone()
            .map(expand)
            .apply(automatic.filter_value_getter),
        value_function: extensions
            .value_function
            .clone()
            .map(expand)
            .apply(automatic.value_function),
    }
}

/// Getters for a property reached directly from the document.
fn document_getters(
    base: &str,
    property: &str,
    data_type: &DataType,
    legacy_prefix: Option<&str>,
) -> Getters {
    if data_type.is_object() || data_type.is_array_of_objects() {
        return Getters {
            value_getter: Some(format!("{}->'{}'", base, property)),
            ..Getters::default()
        };
    }

    if data_type.item().is_some() {
        let array = format!("{}->'{}'", base, property);
        return Getters {
            value_getter: Some(aggregate("elems.value::text", &array)),
            filter_value_getter: Some(aggregate("lower(elems.value::text)", &array)),
            value_function: None,
        };
    }

    let text = format!("{}->>'{}'", base, property);
    match data_type {
        DataType::Integer | DataType::Number => {
            let cast = numeric_cast(data_type);
            Getters {
                value_getter: Some(format!("({}){}", text, cast)),
                filter_value_getter: None,
                value_function: Some(format!("(:value){}", cast)),
            }
        }
        DataType::RangedUuid => Getters {
            value_getter: Some(text),
            ..Getters::default()
        },
        _ => match legacy_prefix {
            Some(prefix) => Getters {
                filter_value_getter: Some(format!("lower({}.f_unaccent({}::text))", prefix, text)),
                value_function: Some(format!("lower({}.f_unaccent(:value))", prefix)),
                value_getter: Some(text),
            },
            None => Getters {
                value_getter: Some(text),
                ..Getters::default()
            },
        },
    }
}

/// Getters for a property of objects inside a jsonb array. Each yields one
/// aggregated array with a value per element.
fn element_getters(array: &str, path: &str, property: &str, data_type: &DataType) -> Getters {
    if data_type.is_object() || data_type.item().is_some() {
        return Getters {
            value_getter: Some(aggregate(&format!("elems.value{}->'{}'", path, property), array)),
            ..Getters::default()
        };
    }

    let element = format!("elems.value{}->>'{}'", path, property);
    match data_type {
        DataType::Integer | DataType::Number => {
            let cast = numeric_cast(data_type);
            Getters {
                value_getter: Some(aggregate(&format!("({}){}", element, cast), array)),
                filter_value_getter: None,
                value_function: Some(format!("(:value){}", cast)),
            }
        }
        _ => Getters {
            value_getter: Some(aggregate(&element, array)),
            filter_value_getter: Some(aggregate(&format!("lower({})", element), array)),
            value_function: Some("lower(:value)".to_string()),
        },
    }
}

fn aggregate(expression: &str, array: &str) -> String {
    format!(
        "(SELECT array_agg({}) FROM jsonb_array_elements({}) AS elems)",
        expression, array
    )
}

fn numeric_cast(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::Number => "::float",
        _ => "::integer",
    }
}
