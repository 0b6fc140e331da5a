//! # entype
//!
//! Compiles JSON Schema resource definitions plus per-module TOML
//! configuration into entity type metadata for a query engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Module (fqm-config.toml + schemas + labels)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inference]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Typed fields: DataType + getters + values + extensions │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [assembly]
//! ┌─────────────────────────────────────────────────────────┐
//! │   EntityType per resource (flattened, overridden)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [joins, once the batch is complete]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Resolved joins across the batch                        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [labels]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Entity types + label maps + diagnostics                │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod assembly;
pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod inference;
pub mod inflection;
pub mod joins;
pub mod labels;
pub mod model;
pub mod schema;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile_batch, compile_module, BatchOutput, CompileError, CompileOptions, ModuleInput,
    };
    pub use crate::config::{ConfigError, EntityTypeConfig, ModuleConfig, ModuleMetadata};
    pub use crate::diagnostics::{Diagnostic, Issue, IssueKind, Severity};
    pub use crate::labels::LabelMap;
    pub use crate::model::{DataType, EntityType, Field, JoinCondition, ResolvedJoin};
}
