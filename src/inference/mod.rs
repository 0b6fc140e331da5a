//! Schema inference: JSON Schema properties to typed fields.
//!
//! # Architecture
//!
//! Inference is a mutually recursive walk over the schema tree:
//!
//! 1. **Type inference** ([`infer_data_type`]) decides the semantic type of a
//!    node. Object nodes hand each property back to field synthesis.
//! 2. **Field synthesis** ([`infer_field`]) combines the type with generated
//!    getters ([`synthesize_getters`]), enumerated values and the property's
//!    `x-fqm-` extensions.
//!
//! Both steps return the issues they found alongside the result. Only an
//! invalid visibility class is fatal.
//!
//! # Example
//!
//! ```ignore
//! use entype::inference::{infer_field, InferenceContext};
//!
//! let ctx = InferenceContext::new("department", "${tenant_id}_mod_users");
//! let outcome = infer_field("deptId", SchemaNode::new(&schema), &ctx)?;
//! ```

pub mod data_type;
pub mod field;
pub mod getters;
pub mod values;

pub use data_type::infer_data_type;
pub use field::{infer_field, FieldOutcome};
pub use getters::{synthesize_getters, Getters};
pub use values::infer_values;

/// Nesting depth past which nodes are typed as plain strings.
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// Where a property lives relative to its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Reached from the document root through `path` (e.g. `->'metadata'`).
    Document { path: String },
    /// Inside each element of the jsonb array `array`, then through `path`.
    ArrayElement { array: String, path: String },
}

/// Everything inference needs to know besides the schema node itself.
#[derive(Debug, Clone)]
pub struct InferenceContext {
    /// Alias getters are written against.
    pub source_alias: String,
    pub scope: Scope,
    pub depth: usize,
    /// Accent/case-folding filter getters for plain leaves.
    pub legacy_index_style: bool,
    /// `${tenant_id}_<module>` schema holding helper functions.
    pub schema_prefix: String,
}

impl InferenceContext {
    /// A root context for properties of the source document.
    pub fn new(source_alias: impl Into<String>, schema_prefix: impl Into<String>) -> Self {
        Self {
            source_alias: source_alias.into(),
            scope: Scope::Document {
                path: String::new(),
            },
            depth: 0,
            legacy_index_style: false,
            schema_prefix: schema_prefix.into(),
        }
    }

    pub fn with_legacy_index_style(mut self, enabled: bool) -> Self {
        self.legacy_index_style = enabled;
        self
    }

    /// The jsonb document, `:<alias>.jsonb`.
    pub fn document(&self) -> String {
        format!(":{}.jsonb", self.source_alias)
    }

    /// Location of `property` inside the value at this location.
    pub fn property(&self, property: &str) -> Self {
        let step = format!("->'{}'", property);
        let scope = match &self.scope {
            Scope::Document { path } => Scope::Document {
                path: format!("{}{}", path, step),
            },
            Scope::ArrayElement { array, path } => Scope::ArrayElement {
                array: array.clone(),
                path: format!("{}{}", path, step),
            },
        };
        self.descend(scope)
    }

    /// Location of the elements of the array at this location.
    ///
    /// Arrays nested inside array elements keep the outer array, so each
    /// outer element contributes one value.
    pub fn elements(&self) -> Self {
        let scope = match &self.scope {
            Scope::Document { path } => Scope::ArrayElement {
                array: format!("{}{}", self.document(), path),
                path: String::new(),
            },
            element @ Scope::ArrayElement { .. } => element.clone(),
        };
        self.descend(scope)
    }

    fn descend(&self, scope: Scope) -> Self {
        Self {
            source_alias: self.source_alias.clone(),
            scope,
            depth: self.depth + 1,
            legacy_index_style: self.legacy_index_style,
            schema_prefix: self.schema_prefix.clone(),
        }
    }

    pub fn too_deep(&self) -> bool {
        self.depth > MAX_SCHEMA_DEPTH
    }
}
