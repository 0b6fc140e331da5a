//! Compiled entity type model.
//!
//! These are the artifacts handed to the query engine. Everything here is
//! plain data with a stable JSON shape (camelCase keys).

pub mod data_type;
pub mod entity_type;
pub mod field;
pub mod join;

pub use data_type::{DataType, DataTypeValue};
pub use entity_type::{EntitySource, EntityType, SortSpec, SourceKind, ENTITY_TYPE_NAMESPACE};
pub use field::{Field, FieldSource, ValueLabel, ValueSourceApi};
pub use join::{IntermediateJoin, JoinCondition, JoinDirection, JoinSpecError, ResolvedJoin};
