//! Database sources declared by a module.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::module::ModuleMetadata;
use crate::compile::CompileError;
use crate::model::{EntitySource, SourceKind};

/// A named source: either a plain table or a SQL view body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceConfig {
    Table {
        name: String,
        table: String,
    },
    Sql {
        name: String,
        sql: String,
        /// Tables the SQL reads from
        #[serde(default)]
        deps: Vec<String>,
    },
}

impl SourceConfig {
    pub fn name(&self) -> &str {
        match self {
            SourceConfig::Table { name, .. } | SourceConfig::Sql { name, .. } => name,
        }
    }

    /// Underlying table, if this source is a plain table.
    pub fn table(&self) -> Option<&str> {
        match self {
            SourceConfig::Table { table, .. } => Some(table),
            SourceConfig::Sql { .. } => None,
        }
    }

    /// Globally unique view name for this source:
    /// `src__<domain>__<module without mod->__<table or name>`, dashes replaced.
    pub fn disambiguated_name(&self, metadata: &ModuleMetadata) -> String {
        let table = self.table().unwrap_or_else(|| self.name());
        let module = metadata.module.strip_prefix("mod-").unwrap_or(&metadata.module);
        format!("src__{}__{}__{}", metadata.domain, module, table).replace('-', "_")
    }
}

/// Build the `sourceMap` for a module, renaming every source to its
/// disambiguated view name.
pub fn disambiguate_sources(
    sources: &[SourceConfig],
    metadata: &ModuleMetadata,
) -> IndexMap<String, String> {
    sources
        .iter()
        .map(|s| (s.name().to_string(), s.disambiguated_name(metadata)))
        .collect()
}

/// Resolve a declared source key to the entity type source definition.
///
/// The key is looked up by name; if no source has that name, the rename map is
/// followed (`key → renamed → ...`) until a declared source is found. The
/// resolved source keeps the declared key as its alias, since getters are
/// written against it. Its target is the renamed view, falling back to the
/// table (or the source name for SQL sources).
pub fn resolve_source(
    key: &str,
    sources: &[SourceConfig],
    source_map: &IndexMap<String, String>,
) -> Result<EntitySource, CompileError> {
    let mut current = key;
    let mut visited = HashSet::new();

    let source = loop {
        if let Some(source) = sources.iter().find(|s| s.name() == current) {
            break source;
        }
        if !visited.insert(current) {
            return Err(CompileError::SourceCycle {
                name: key.to_string(),
            });
        }
        match source_map.get(current) {
            Some(next) => current = next,
            None => {
                return Err(CompileError::SourceNotFound {
                    name: key.to_string(),
                })
            }
        }
    };

    let target = source_map
        .get(source.name())
        .cloned()
        .or_else(|| source.table().map(str::to_string))
        .unwrap_or_else(|| source.name().to_string());

    Ok(EntitySource {
        kind: SourceKind::Db,
        alias: key.to_string(),
        target: Some(target),
    })
}
