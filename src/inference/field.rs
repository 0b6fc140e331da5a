//! Field synthesis for a single schema property.

use log::debug;

use super::data_type::infer_data_type;
use super::getters::synthesize_getters;
use super::values::infer_values;
use super::InferenceContext;
use crate::compile::CompileError;
use crate::inflection::snake_case;
use crate::model::Field;
use crate::schema::{Extensions, SchemaNode, Visibility};

/// Emitted for virtual properties when `x-fqm-ignore` is not set either way.
pub const VIRTUAL_PROPERTY_WARNING: &str = "It looks like this is a virtual property (folio:isVirtual=true); set x-fqm-ignore to true or false to silence this warning";

/// Result of synthesizing one property.
///
/// `field` is `None` when the property is ignored or skipped.
#[derive(Debug, Clone, Default)]
pub struct FieldOutcome {
    pub issues: Vec<String>,
    pub field: Option<Field>,
}

impl FieldOutcome {
    fn skipped(issues: Vec<String>) -> Self {
        Self { issues, field: None }
    }
}

/// Synthesize the field for `property`, a property of the value at `ctx`.
///
/// # Errors
///
/// Returns [`CompileError::InvalidVisibility`] if the property (or any nested
/// property) declares an unknown visibility class.
pub fn infer_field(
    property: &str,
    node: SchemaNode<'_>,
    ctx: &InferenceContext,
) -> Result<FieldOutcome, CompileError> {
    debug!("Examining property {} ({:?})", property, ctx.scope);

    match node.ignore() {
        Some(Ok(true)) => return Ok(FieldOutcome::skipped(Vec::new())),
        None if node.is_virtual() => {
            return Ok(FieldOutcome::skipped(vec![VIRTUAL_PROPERTY_WARNING.to_string()]))
        }
        _ => {}
    }

    let (extensions, mut issues) = Extensions::parse(property, node)?;

    let (data_type, type_issues) = infer_data_type(node, &ctx.property(property))?;
    issues.extend(type_issues);

    let getters = synthesize_getters(property, &data_type, ctx, &extensions);
    let inferred_values = infer_values(&data_type, node);

    let default_name = snake_case(property);
    let is_id_column = extensions
        .is_id_column
        .or_else(|| (default_name == "id").then_some(true));

    let mut field = Field::new(extensions.name.clone().unwrap_or(default_name), data_type);
    field.source_alias = Some(ctx.source_alias.clone());
    field.is_id_column = is_id_column;
    field.value_getter = getters.value_getter;
    field.filter_value_getter = getters.filter_value_getter;
    field.value_function = getters.value_function;
    field.values = extensions.values.or(inferred_values);
    field.value_source_api = extensions.value_source_api;
    if let Some(visible) = extensions.visible_by_default {
        field.visible_by_default = visible;
    }
    if let Some(visibility) = extensions.visibility {
        apply_visibility(&mut field, visibility);
    }
    field.essential = extensions.essential;
    field.joins_to_intermediate = extensions.joins_to;
    field.joins_to = extensions.joins_to_raw.filter(|joins| !joins.is_empty());
    field.source = extensions.source;

    Ok(FieldOutcome {
        issues,
        field: Some(field),
    })
}

fn apply_visibility(field: &mut Field, visibility: Visibility) {
    match visibility {
        Visibility::All => {
            field.queryable = true;
            field.query_only = Some(false);
            field.hidden = Some(false);
        }
        Visibility::QueryOnly => {
            field.queryable = true;
            field.query_only = Some(true);
            field.hidden = Some(false);
        }
        Visibility::ResultsOnly => {
            field.queryable = false;
            field.query_only = Some(false);
            field.hidden = Some(false);
        }
        Visibility::Hidden => field.hidden = Some(true),
    }
}
