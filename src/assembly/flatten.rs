// src/assembly/flatten.rs
use std::mem;

use crate::inflection::snake_case;
use crate::model::{DataType, Field};

/// Replace every top-level object column by its properties, renamed
/// `<parent>_<child>`, until no object columns remain.
///
/// Objects nested under arrays are left alone. Running this on its own
/// output is a no-op.
pub fn flatten_object_columns(mut columns: Vec<Field>) -> Vec<Field> {
    while columns.iter().any(|c| c.data_type.is_object()) {
        let mut flattened = Vec::with_capacity(columns.len());
        for mut column in columns {
            match mem::replace(&mut column.data_type, DataType::String) {
                DataType::Object(properties) => {
                    flattened.extend(properties.into_iter().map(|child| Field {
                        name: format!("{}_{}", column.name, snake_case(&child.name)),
                        ..child
                    }));
                }
                data_type => {
                    column.data_type = data_type;
                    flattened.push(column);
                }
            }
        }
        columns = flattened;
    }
    columns
}

/// Mark every property of an object reached through an array as not
/// queryable. The query engine cannot filter on these yet.
pub fn mark_nested_array_objects_non_queryable(columns: &mut [Field]) {
    for column in columns {
        mark(&mut column.data_type, false);
    }
}

fn mark(data_type: &mut DataType, under_array: bool) {
    match data_type {
        DataType::Object(properties) => {
            for property in properties {
                if under_array {
                    property.queryable = false;
                }
                mark(&mut property.data_type, under_array);
            }
        }
        DataType::Array(item) | DataType::JsonbArray(item) => mark(item, true),
        _ => {}
    }
}
