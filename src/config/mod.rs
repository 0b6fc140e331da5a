//! Configuration module for entype.
//!
//! Handles per-module TOML configuration and source resolution.

mod module;
mod source;

pub use module::{ConfigError, Domain, EntityTypeConfig, ModuleConfig, ModuleMetadata};
pub use source::{disambiguate_sources, resolve_source, SourceConfig};
