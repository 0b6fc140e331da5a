//! Batch compilation of modules into entity types.
//!
//! This module drives the whole pipeline for a batch of modules:
//!
//! ```text
//! Phase 1 (per resource):  schema + config → assemble_entity_type → EntityType
//!                                         │
//!                           ── barrier: every resource assembled ──
//!                                         │
//! Phase 2 (whole batch):   resolve_joins → labels → BatchOutput
//! ```
//!
//! A fatal [`CompileError`] aborts only the resource that raised it; it is
//! reported as an error diagnostic and the rest of the batch continues.
//!
//! # Example
//!
//! ```ignore
//! use entype::compile::{compile_batch, CompileOptions, ModuleInput};
//! use entype::config::ModuleConfig;
//!
//! let config = ModuleConfig::load(Path::new("mod-users/fqm-config.toml"))?;
//! let mut module = ModuleInput::new(config);
//! module.add_schema("schemas/department.json", schema);
//!
//! let output = compile_batch(&[module], &CompileOptions::default());
//! for diagnostic in &output.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! ```

use indexmap::IndexMap;
use log::{info, warn};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::assembly::assemble_entity_type;
use crate::config::{ModuleConfig, ModuleMetadata};
use crate::diagnostics::{Diagnostic, Issue, IssueKind, Severity};
use crate::inflection::disambiguate_name;
use crate::joins::resolve_joins;
use crate::labels::{
    infer_entity_labels, merge_locale, missing_labels, reconcile_external_labels, LabelMap,
};
use crate::model::EntityType;

/// Locale whose label file must cover every inferred key.
pub const REFERENCE_LOCALE: &str = "en";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort compilation of one resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("Schema {schema} must be an object with properties")]
    InvalidRootSchema { schema: String },

    #[error("Source {name} not found in source list")]
    SourceNotFound { name: String },

    #[error("Source {name} is part of a rename cycle")]
    SourceCycle { name: String },

    #[error("Invalid value for x-fqm-visibility in property {property}: {value}")]
    InvalidVisibility { property: String, value: String },
}

impl CompileError {
    /// Issue kind used when reporting this error.
    pub fn issue_kind(&self) -> IssueKind {
        match self {
            CompileError::InvalidRootSchema { .. } | CompileError::InvalidVisibility { .. } => {
                IssueKind::Schema
            }
            CompileError::SourceNotFound { .. } | CompileError::SourceCycle { .. } => {
                IssueKind::Config
            }
        }
    }

    pub fn to_issue(&self) -> Issue {
        Issue::new(Severity::Error, self.issue_kind(), self.to_string())
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options for batch compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Substitute a placeholder target for joins to missing entity types.
    /// Also enabled when any module in the batch sets `forceGenerateJoins`.
    pub force_generate_joins: bool,
}

impl CompileOptions {
    pub fn with_force_generate_joins(mut self, force: bool) -> Self {
        self.force_generate_joins = force;
        self
    }
}

// ============================================================================
// Inputs and Outputs
// ============================================================================

/// A module ready for compilation.
#[derive(Debug, Clone)]
pub struct ModuleInput {
    pub config: ModuleConfig,
    /// Dereferenced schemas, keyed by each resource's `schema` path.
    pub schemas: HashMap<String, Value>,
    /// Externally authored labels, keyed by locale.
    pub labels: IndexMap<String, LabelMap>,
}

impl ModuleInput {
    pub fn new(config: ModuleConfig) -> Self {
        Self {
            config,
            schemas: HashMap::new(),
            labels: IndexMap::new(),
        }
    }

    pub fn add_schema(&mut self, path: impl Into<String>, schema: Value) {
        self.schemas.insert(path.into(), schema);
    }

    pub fn add_labels(&mut self, locale: impl Into<String>, labels: LabelMap) {
        self.labels.insert(locale.into(), labels);
    }
}

/// Entity types assembled from one module, before join resolution.
#[derive(Debug, Clone)]
pub struct ModuleOutput {
    pub entity_types: Vec<EntityType>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything produced by a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub entity_types: Vec<EntityType>,
    pub diagnostics: Vec<Diagnostic>,
    /// Inferred default labels for every entity type.
    pub labels: LabelMap,
    /// Per-locale labels: inferred defaults overlaid by module labels.
    pub locales: IndexMap<String, LabelMap>,
}

impl BatchOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity() == Severity::Error)
    }

    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.iter().find(|et| et.name == name)
    }
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Assemble every resource of one module. Joins stay unresolved.
pub fn compile_module(module: &ModuleInput) -> ModuleOutput {
    let metadata = &module.config.metadata;
    let mut entity_types = Vec::new();
    let mut diagnostics = Vec::new();

    for entity in &module.config.entity_types {
        let entity_name = disambiguate_name(&metadata.module, &entity.name);
        let Some(schema) = module.schemas.get(&entity.schema) else {
            warn!("No schema provided for {} ({})", entity.name, entity.schema);
            diagnostics.push(
                Diagnostic::new(Issue::new(
                    Severity::Error,
                    IssueKind::Config,
                    format!("Schema {} was not provided", entity.schema),
                ))
                .for_entity(&entity_name)
                .in_module(metadata),
            );
            continue;
        };

        match assemble_entity_type(entity, schema, &module.config) {
            Ok(assembled) => {
                diagnostics.extend(assembled.issues.into_iter().map(|issue| {
                    Diagnostic::new(issue)
                        .for_entity(&assembled.entity_type.name)
                        .in_module(metadata)
                }));
                entity_types.push(assembled.entity_type);
            }
            Err(e) => {
                warn!("Unable to compile {}: {}", entity.name, e);
                diagnostics.push(
                    Diagnostic::new(e.to_issue())
                        .for_entity(&entity_name)
                        .in_module(metadata),
                );
            }
        }
    }

    ModuleOutput {
        entity_types,
        diagnostics,
    }
}

/// Compile a batch of modules: assemble everything, then resolve joins
/// across the batch and reconcile labels.
pub fn compile_batch(modules: &[ModuleInput], options: &CompileOptions) -> BatchOutput {
    let mut output = BatchOutput::default();
    let mut owners: HashMap<String, usize> = HashMap::new();

    for (index, module) in modules.iter().enumerate() {
        let compiled = compile_module(module);
        info!(
            "Compiled {} entity types for {}",
            compiled.entity_types.len(),
            module.config.metadata.module
        );
        for entity_type in &compiled.entity_types {
            owners.insert(entity_type.name.clone(), index);
        }
        output.entity_types.extend(compiled.entity_types);
        output.diagnostics.extend(compiled.diagnostics);
    }

    let force = options.force_generate_joins
        || modules.iter().any(|m| m.config.force_generate_joins);
    let join_diagnostics = resolve_joins(&mut output.entity_types, force);
    output
        .diagnostics
        .extend(join_diagnostics.into_iter().map(|d| {
            let owner = d
                .entity_type_name
                .as_ref()
                .and_then(|name| owners.get(name))
                .map(|&i| &modules[i].config.metadata);
            match owner {
                Some(metadata) => d.in_module(metadata),
                None => d,
            }
        }));

    for (index, module) in modules.iter().enumerate() {
        let owned: Vec<&EntityType> = output
            .entity_types
            .iter()
            .filter(|et| owners.get(&et.name) == Some(&index))
            .collect();
        let inferred = owned.iter().fold(LabelMap::new(), |mut labels, et| {
            labels.extend(infer_entity_labels(et));
            labels
        });

        let diagnostics = reconcile_module_labels(module, &inferred, &mut output.locales);
        output.diagnostics.extend(diagnostics);
        output.labels.extend(inferred);
    }

    info!(
        "Batch finished: {} entity types, {} diagnostics",
        output.entity_types.len(),
        output.diagnostics.len()
    );
    output
}

fn reconcile_module_labels(
    module: &ModuleInput,
    inferred: &LabelMap,
    locales: &mut IndexMap<String, LabelMap>,
) -> Vec<Diagnostic> {
    let metadata: &ModuleMetadata = &module.config.metadata;
    let expected: HashSet<String> = inferred.keys().cloned().collect();
    let mut diagnostics = Vec::new();

    for (locale, external) in &module.labels {
        let (provided, extra) = reconcile_external_labels(external, &metadata.module, &expected);
        if let Some(issue) = extra {
            diagnostics.push(Diagnostic::new(issue).in_module(metadata));
        }
        if locale == REFERENCE_LOCALE {
            if let Some(issue) = missing_labels(inferred, &provided) {
                diagnostics.push(Diagnostic::new(issue).in_module(metadata));
            }
        }
        locales
            .entry(locale.clone())
            .or_default()
            .extend(merge_locale(inferred, &provided));
    }

    diagnostics
}
