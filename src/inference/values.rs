// src/inference/values.rs
use crate::inflection::sentence_case;
use crate::model::{DataType, ValueLabel};
use crate::schema::SchemaNode;

/// Enumerated values for a field: the schema's `enum` with sentence-cased
/// labels, or `true`/`false` for booleans.
pub fn infer_values(data_type: &DataType, node: SchemaNode<'_>) -> Option<Vec<ValueLabel>> {
    if let Some(values) = node.enum_values() {
        return Some(
            values
                .into_iter()
                .map(|value| {
                    let label = sentence_case(&value);
                    ValueLabel::new(value, label)
                })
                .collect(),
        );
    }

    match data_type {
        DataType::Boolean => Some(vec![
            ValueLabel::new("true", "True"),
            ValueLabel::new("false", "False"),
        ]),
        _ => None,
    }
}
