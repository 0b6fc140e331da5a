//! TOML module configuration.
//!
//! One file per module describes its metadata, the database sources its
//! resources read from, and one entry per entity type to generate.
//!
//! Example configuration:
//! ```toml
//! [metadata]
//! team = "corsair"
//! domain = "users"
//! module = "mod-users"
//!
//! [[sources]]
//! name = "department"
//! table = "departments"
//!
//! [[entityTypes]]
//! name = "simple_department"
//! source = "department"
//! schema = "schemas/department.json"
//! permissions = ["departments.collection.get"]
//! sort = ["id", "ASC"]
//! useRmbIndexStyle = true
//! fieldExclusions = ["metadata_created_by_username"]
//!
//! [entityTypes.fieldOverrides.name]
//! visibleByDefault = true
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::source::SourceConfig;
use crate::model::Field;

/// Error type for module configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Business domain a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Acquisition,
    Catalog,
    Circulation,
    Erm,
    System,
    Users,
    Other,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Acquisition => "acquisition",
            Domain::Catalog => "catalog",
            Domain::Circulation => "circulation",
            Domain::Erm => "erm",
            Domain::System => "system",
            Domain::Users => "users",
            Domain::Other => "other",
        };
        f.write_str(name)
    }
}

/// Who owns a module and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleMetadata {
    pub team: String,
    pub domain: Domain,
    pub module: String,
}

/// Root configuration of one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleConfig {
    pub metadata: ModuleMetadata,

    /// Named database sources.
    pub sources: Vec<SourceConfig>,

    /// Source renames (original name → view name), applied before lookup.
    #[serde(default)]
    pub source_map: IndexMap<String, String>,

    /// Substitute a placeholder for join targets that do not exist yet.
    #[serde(default)]
    pub force_generate_joins: bool,

    #[serde(default)]
    pub entity_types: Vec<EntityTypeConfig>,
}

impl ModuleConfig {
    /// Load a module configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a module configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ModuleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.metadata.module.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "metadata.module must not be empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for entity_type in &self.entity_types {
            if !seen.insert(entity_type.name.as_str()) {
                return Err(ConfigError::InvalidConfig(format!(
                    "duplicate entity type name: {}",
                    entity_type.name
                )));
            }
        }

        Ok(())
    }

    pub fn entity_type(&self, name: &str) -> Option<&EntityTypeConfig> {
        self.entity_types.iter().find(|e| e.name == name)
    }

    /// Schema prefix of the module's database objects, e.g. `${tenant_id}_mod_users`.
    pub fn schema_prefix(&self) -> String {
        format!("${{tenant_id}}_{}", self.metadata.module).replace('-', "_")
    }
}

/// Configuration of one entity type (resource).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityTypeConfig {
    pub name: String,

    #[serde(default)]
    pub private: bool,

    /// Key of the source in the module's source list.
    pub source: String,

    /// Path of the (dereferenced) JSON schema, relative to the module.
    pub schema: String,

    pub permissions: Vec<String>,

    /// `[column, direction]`
    pub sort: (String, String),

    /// Generate accent/case-folding filter getters for string fields.
    #[serde(default, rename = "useRmbIndexStyle")]
    pub legacy_index_style: bool,

    /// Append the raw `jsonb` document field (defaults to true).
    #[serde(default)]
    pub include_jsonb_field: Option<bool>,

    /// Complete fields added to (or replacing) inferred ones by name.
    #[serde(default)]
    pub field_additions: Vec<Field>,

    #[serde(default)]
    pub field_exclusions: Vec<String>,

    /// Partial field JSON merged over the inferred field with that name.
    #[serde(default)]
    pub field_overrides: IndexMap<String, serde_json::Value>,
}

impl EntityTypeConfig {
    /// A resource entry with defaults for everything optional.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            private: false,
            source: source.into(),
            schema: schema.into(),
            permissions: Vec::new(),
            sort: ("id".to_string(), "ASC".to_string()),
            legacy_index_style: false,
            include_jsonb_field: None,
            field_additions: Vec::new(),
            field_exclusions: Vec::new(),
            field_overrides: IndexMap::new(),
        }
    }

    pub fn includes_jsonb_field(&self) -> bool {
        self.include_jsonb_field.unwrap_or(true)
    }
}
