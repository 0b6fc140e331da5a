//! Type inference for schema nodes.

use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;

use super::field::infer_field;
use super::{InferenceContext, MAX_SCHEMA_DEPTH};
use crate::compile::CompileError;
use crate::model::{DataType, DataTypeValue, Field};
use crate::schema::{unknown_extensions, SchemaNode};

/// Patterns modules commonly use instead of `format: uuid`. Compared as text.
pub const UUID_PATTERNS: [&str; 3] = [
    "^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$",
    "^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$",
    "^[a-f0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$",
];

static UUID_REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\buuid\b").unwrap());

const UNKNOWN_ITEMS: &str = "Array type with unknown item type; defaulting to string";

type Inferred = Result<(DataType, Vec<String>), CompileError>;

/// Infer the semantic type of the node at `ctx`.
///
/// The first matching rule wins: an `x-fqm-data-type` override, a `$ref`,
/// then the `type` keyword. Object properties are synthesized into full
/// fields, so the only error is one bubbling up from a nested property.
pub fn infer_data_type(node: SchemaNode<'_>, ctx: &InferenceContext) -> Inferred {
    let mut issues = Vec::new();

    if ctx.too_deep() {
        warn!("Schema nesting exceeds depth {} at {:?}", MAX_SCHEMA_DEPTH, ctx.scope);
        issues.push(format!(
            "Schema nesting exceeds depth {}; treating as string",
            MAX_SCHEMA_DEPTH
        ));
        return Ok((DataType::String, issues));
    }

    match node.data_type_override() {
        Some(Ok(kind @ (DataTypeValue::Array | DataTypeValue::JsonbArray))) => {
            return infer_array(node, kind, ctx, issues)
        }
        Some(Ok(DataTypeValue::Object)) => return infer_object(node, ctx, issues),
        Some(Ok(kind)) => {
            debug!("Using data type override {}", kind);
            if let Some(leaf) = kind.leaf() {
                return Ok((leaf, issues));
            }
        }
        Some(Err(tag)) => issues.push(format!("Unknown data type override: {}", tag)),
        None => {}
    }

    if let Some(reference) = node.reference() {
        if UUID_REFERENCE.is_match(reference) {
            return Ok((DataType::RangedUuid, issues));
        }
        issues.push(format!("Unknown reference: \"{}\"", reference));
        return Ok((DataType::String, issues));
    }

    let type_keyword = node.type_keyword();
    match type_keyword.as_deref() {
        Some("string") | Some("string,null") => Ok((string_type(node), issues)),
        Some("boolean") => Ok((DataType::Boolean, issues)),
        Some("number") => Ok((DataType::Number, issues)),
        Some("integer") => Ok((DataType::Integer, issues)),
        Some("array") => infer_array(node, DataTypeValue::JsonbArray, ctx, issues),
        Some("object") => infer_object(node, ctx, issues),
        other => {
            warn!("Unknown type {:?}", other);
            issues.push(format!("Unknown type: {}", other.unwrap_or("undefined")));
            Ok((DataType::String, issues))
        }
    }
}

fn string_type(node: SchemaNode<'_>) -> DataType {
    match node.format() {
        Some("date") | Some("date-time") => return DataType::Date,
        Some("uuid") => return DataType::RangedUuid,
        _ => {}
    }

    match node.pattern() {
        Some(pattern) if UUID_PATTERNS.contains(&pattern) => DataType::RangedUuid,
        _ => DataType::String,
    }
}

fn infer_array(
    node: SchemaNode<'_>,
    kind: DataTypeValue,
    ctx: &InferenceContext,
    mut issues: Vec<String>,
) -> Inferred {
    let item = match node.items() {
        None => {
            warn!("{}", UNKNOWN_ITEMS);
            issues.push(UNKNOWN_ITEMS.to_string());
            DataType::String
        }
        Some(items) => {
            issues.extend(unknown_extensions("array items", items));
            let (item, inner) = infer_data_type(items, &ctx.elements())?;
            issues.extend(inner.into_iter().map(|e| format!("in array: {}", e)));
            item
        }
    };

    Ok((DataType::array_of(kind, item), issues))
}

fn infer_object(node: SchemaNode<'_>, ctx: &InferenceContext, mut issues: Vec<String>) -> Inferred {
    let mut properties: Vec<Field> = Vec::new();

    for (property, child) in node.properties().unwrap_or_default() {
        // Explicitly ignored properties are not worth a warning
        if child.is_ignored() {
            continue;
        }

        let outcome = infer_field(property, child, ctx)?;
        issues.extend(
            outcome
                .issues
                .into_iter()
                .map(|e| format!("in object property {}: {}", property, e)),
        );

        match outcome.field {
            Some(field) => properties.push(field),
            None => issues.push(format!(
                "in object property {}: unable to generate field",
                property
            )),
        }
    }

    Ok((DataType::Object(properties), issues))
}
