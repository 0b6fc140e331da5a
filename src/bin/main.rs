//! entype CLI - Compile module schemas to entity types
//!
//! Usage:
//!   entype compile <module-dir>... [--force-generate-joins] [--output json]
//!   entype validate <module-dir>... [--annotations github]
//!   entype labels <module-dir>... [--locale <locale>] [--module-keys]
//!
//! Each module directory holds an `fqm-config.toml`, the schemas it names,
//! and optional `translations/<locale>.json` label files.
//!
//! Examples:
//!   entype compile modules/mod-users modules/mod-orders
//!   RUST_LOG=debug entype validate modules/mod-users --annotations github
//!   entype labels modules/mod-users --locale en

use clap::{Parser, Subcommand, ValueEnum};
use entype::compile::{compile_batch, BatchOutput, CompileOptions, ModuleInput};
use entype::config::{disambiguate_sources, ModuleConfig};
use entype::diagnostics::{count_at_least, Diagnostic, Severity};
use entype::labels::{unmarshal_label_key, LabelMap, EXPECTED_LOCALES};
use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const CONFIG_FILE: &str = "fqm-config.toml";
const TRANSLATIONS_DIR: &str = "translations";

#[derive(Parser)]
#[command(name = "entype")]
#[command(about = "entype - Compile JSON Schema resources into query-engine entity types")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile modules and print the entity types
    Compile {
        /// Module directories
        #[arg(required = true)]
        modules: Vec<PathBuf>,

        /// Use a placeholder for joins to entity types outside the batch
        #[arg(short, long)]
        force_generate_joins: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Diagnostic format
        #[arg(short, long, default_value = "plain")]
        annotations: AnnotationFormat,
    },

    /// Compile modules and report diagnostics only
    Validate {
        /// Module directories
        #[arg(required = true)]
        modules: Vec<PathBuf>,

        #[arg(short, long)]
        force_generate_joins: bool,

        /// Diagnostic format
        #[arg(short, long, default_value = "plain")]
        annotations: AnnotationFormat,
    },

    /// Print the label map of the batch
    Labels {
        /// Module directories
        #[arg(required = true)]
        modules: Vec<PathBuf>,

        /// Locale to print (inferred defaults if not specified)
        #[arg(short, long)]
        locale: Option<String>,

        /// Print keys the way modules author them (`fqm.entityType.<resource>...`)
        #[arg(short, long)]
        module_keys: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One summary line per entity type
    Pretty,
    /// Entity types as a JSON array
    Json,
}

#[derive(Clone, ValueEnum)]
enum AnnotationFormat {
    /// `[domain->module (team t)] Title: message`
    Plain,
    /// GitHub Actions workflow commands
    Github,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            modules,
            force_generate_joins,
            output,
            annotations,
        } => cmd_compile(&modules, force_generate_joins, output, annotations),
        Commands::Validate {
            modules,
            force_generate_joins,
            annotations,
        } => cmd_validate(&modules, force_generate_joins, annotations),
        Commands::Labels {
            modules,
            locale,
            module_keys,
        } => cmd_labels(&modules, locale, module_keys),
    }
}

fn cmd_compile(
    dirs: &[PathBuf],
    force: bool,
    output: OutputFormat,
    annotations: AnnotationFormat,
) -> ExitCode {
    let Some(batch) = run_batch(dirs, force) else {
        return ExitCode::from(2);
    };

    match output {
        OutputFormat::Pretty => {
            for entity_type in &batch.entity_types {
                println!(
                    "{} ({}): {} columns",
                    entity_type.name,
                    entity_type.id,
                    entity_type.columns.len()
                );
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&batch.entity_types) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing entity types: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    report(&batch.diagnostics, &annotations);
    exit_code(&batch)
}

fn cmd_validate(dirs: &[PathBuf], force: bool, annotations: AnnotationFormat) -> ExitCode {
    let Some(batch) = run_batch(dirs, force) else {
        return ExitCode::from(2);
    };

    report(&batch.diagnostics, &annotations);
    println!(
        "{} entity types, {} errors, {} warnings",
        batch.entity_types.len(),
        count_at_least(&batch.diagnostics, Severity::Error),
        count_at_least(&batch.diagnostics, Severity::Warning)
            - count_at_least(&batch.diagnostics, Severity::Error)
    );
    exit_code(&batch)
}

fn cmd_labels(dirs: &[PathBuf], locale: Option<String>, module_keys: bool) -> ExitCode {
    let Some(batch) = run_batch(dirs, false) else {
        return ExitCode::from(2);
    };

    let labels = match &locale {
        Some(locale) => match batch.locales.get(locale) {
            Some(labels) => labels,
            None => {
                eprintln!("No labels for locale '{}'", locale);
                return ExitCode::FAILURE;
            }
        },
        None => &batch.labels,
    };

    let labels: LabelMap = if module_keys {
        labels
            .iter()
            .map(|(key, value)| (unmarshal_label_key(key), value.clone()))
            .collect()
    } else {
        labels.clone()
    };

    match serde_json::to_string_pretty(&labels) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing labels: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Module Loading
// ============================================================================

/// Load every module directory and compile the batch. `None` when no module
/// could be loaded.
fn run_batch(dirs: &[PathBuf], force: bool) -> Option<BatchOutput> {
    let modules: Vec<ModuleInput> = dirs.iter().filter_map(|dir| load_module(dir)).collect();
    if modules.is_empty() {
        eprintln!("No valid configs found. Exiting.");
        return None;
    }

    let options = CompileOptions::default().with_force_generate_joins(force);
    Some(compile_batch(&modules, &options))
}

fn load_module(dir: &Path) -> Option<ModuleInput> {
    let config_path = dir.join(CONFIG_FILE);
    let mut config = match ModuleConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading '{}': {}", config_path.display(), e);
            return None;
        }
    };

    info!(
        "Processing {}->{} (team {}) from {}",
        config.metadata.domain,
        config.metadata.module,
        config.metadata.team,
        dir.display()
    );

    let renamed = disambiguate_sources(&config.sources, &config.metadata);
    config.source_map.extend(renamed);

    let mut module = ModuleInput::new(config);

    let schema_paths: Vec<String> = module
        .config
        .entity_types
        .iter()
        .map(|et| et.schema.clone())
        .collect();
    for schema_path in schema_paths {
        // Missing schemas are reported per resource by the batch
        if let Some(schema) = read_json(&dir.join(&schema_path)) {
            module.add_schema(schema_path, schema);
        }
    }

    for (locale, labels) in load_translations(&dir.join(TRANSLATIONS_DIR)) {
        module.add_labels(locale, labels);
    }

    Some(module)
}

fn load_translations(dir: &Path) -> Vec<(String, LabelMap)> {
    let Ok(entries) = fs::read_dir(dir) else {
        debug!("No translations in {}", dir.display());
        return Vec::new();
    };

    let mut translations = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(locale) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        if !EXPECTED_LOCALES.contains(&locale.as_str()) {
            warn!("Unexpected locale file {}", path.display());
        }
        let Some(value) = read_json(&path) else {
            continue;
        };
        match serde_json::from_value::<LabelMap>(value) {
            Ok(labels) => translations.push((locale, labels)),
            Err(e) => eprintln!("Error reading labels '{}': {}", path.display(), e),
        }
    }

    translations.sort_by(|a, b| a.0.cmp(&b.0));
    translations
}

fn read_json(path: &Path) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            eprintln!("Error parsing '{}': {}", path.display(), e);
            None
        }
    }
}

// ============================================================================
// Reporting
// ============================================================================

fn report(diagnostics: &[Diagnostic], format: &AnnotationFormat) {
    for diagnostic in diagnostics {
        match format {
            AnnotationFormat::Plain => eprintln!("{}", diagnostic),
            AnnotationFormat::Github => eprintln!("{}", diagnostic.github_annotation()),
        }
    }
}

fn exit_code(batch: &BatchOutput) -> ExitCode {
    if batch.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
