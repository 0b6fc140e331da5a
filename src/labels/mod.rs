//! Label key inference and reconciliation.
//!
//! Every entity type and column gets a translation key with an inferred
//! English default:
//!
//! - `entityType.<name>`
//! - `entityType.<name>.<column>`
//! - `entityType.<name>.<column>.<property>` for object properties, plus
//!   `....<property>._qualified` (`"<column> <property>"`)
//!
//! Arrays never add a key segment; their item type is labeled under the
//! array's own key.
//!
//! Modules author their labels under a generic `fqm.entityType.<resource>`
//! prefix. [`reconcile_external_labels`] moves them into the disambiguated
//! namespace and drops those no entity type expects.

use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::diagnostics::{Issue, IssueKind, Severity};
use crate::inflection::{disambiguate_name, sentence_case};
use crate::model::{DataType, EntityType, Field};

/// Ordered translation key → label map.
pub type LabelMap = IndexMap<String, String>;

/// Locales a module is expected to ship label files for.
pub const EXPECTED_LOCALES: &[&str] = &[
    "ar", "ber", "ca", "cs_CZ", "da", "de", "en_GB", "en_SE", "en_US", "en", "es_419", "es_ES",
    "es", "fr_FR", "fr", "he", "hi_IN", "hu", "it_IT", "ja", "ko", "nb", "nl", "nn", "pl", "pt_BR",
    "pt_PT", "ru", "sk", "sv", "uk", "ur", "zh_CN", "zh_TW", "zu",
];

/// Prefix of externally authored label keys.
pub const EXTERNAL_PREFIX: &str = "fqm.";

static ID_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bid\b").unwrap());

/// Fixed labels for the usual record metadata columns.
const CONVENTION_LABELS: &[(&str, &str)] = &[
    ("created_date", "Created date"),
    ("created_by_user_id", "Created by user UUID"),
    ("created_by_username", "Created by username"),
    ("updated_date", "Updated date"),
    ("updated_by_user_id", "Updated by user UUID"),
    ("updated_by_username", "Updated by username"),
];

// ============================================================================
// Inference
// ============================================================================

/// Labels for an entity type and all of its columns.
pub fn infer_entity_labels(entity_type: &EntityType) -> LabelMap {
    let mut labels = LabelMap::new();
    labels.insert(
        format!("entityType.{}", entity_type.name),
        sentence_case(entity_type.resource_name()),
    );
    for column in &entity_type.columns {
        labels.extend(infer_field_labels(column, &entity_type.name));
    }
    labels
}

/// Labels for one column of the entity type named `parent`.
pub fn infer_field_labels(field: &Field, parent: &str) -> LabelMap {
    let mut labels = LabelMap::new();
    let mut stack: Vec<(String, String, &DataType)> = vec![(
        format!("entityType.{}.{}", parent, field.name),
        field.name.clone(),
        &field.data_type,
    )];

    while let Some((key, name, data_type)) = stack.pop() {
        labels.insert(key.clone(), label_for(&name, data_type));

        match data_type {
            DataType::Object(properties) => {
                for property in properties {
                    stack.push((
                        format!("{}.{}", key, property.name),
                        property.name.clone(),
                        &property.data_type,
                    ));
                    stack.push((
                        format!("{}.{}._qualified", key, property.name),
                        format!("{} {}", name, property.name),
                        &property.data_type,
                    ));
                }
            }
            DataType::Array(item) | DataType::JsonbArray(item) => stack.push((key, name, item)),
            _ => {}
        }
    }

    labels
}

fn label_for(name: &str, data_type: &DataType) -> String {
    if name == "jsonb" {
        return "JSONB".to_string();
    }

    let bare = name.strip_prefix("metadata_").unwrap_or(name);
    if let Some((_, label)) = CONVENTION_LABELS.iter().find(|(n, _)| *n == bare) {
        return (*label).to_string();
    }

    let label = sentence_case(name);
    match data_type {
        DataType::RangedUuid => ID_WORD.replace(&label, "UUID").into_owned(),
        _ => label,
    }
}

// ============================================================================
// External Labels
// ============================================================================

/// Move externally authored labels into the disambiguated namespace.
///
/// Keys outside the `fqm.` prefix are ignored. Re-keyed labels no entity
/// type expects are dropped and reported in a single warning listing their
/// original keys.
pub fn reconcile_external_labels(
    external: &LabelMap,
    module: &str,
    expected: &HashSet<String>,
) -> (LabelMap, Option<Issue>) {
    let mut labels = LabelMap::new();
    let mut extra = Vec::new();

    for (key, value) in external {
        if !key.starts_with(EXTERNAL_PREFIX) {
            continue;
        }
        match rekey(key, module) {
            Some(new_key) if expected.contains(&new_key) => {
                labels.insert(new_key, value.clone());
            }
            _ => extra.push(key.clone()),
        }
    }

    debug!("Reconciled {} labels for {} ({} extra)", labels.len(), module, extra.len());

    let issue = (!extra.is_empty()).then(|| {
        Issue::new(
            Severity::Warning,
            IssueKind::LabelsExtra { keys: extra.clone() },
            format!(
                "Translations with no matching entity type or field: {}",
                extra.join(", ")
            ),
        )
    });

    (labels, issue)
}

/// `fqm.entityType.<resource>...` → `entityType.<module>__<resource>...`
fn rekey(key: &str, module: &str) -> Option<String> {
    let entity = key.split('.').nth(2)?;
    let from = format!("fqm.entityType.{}", entity);
    if !key.starts_with(&from) {
        return None;
    }
    Some(key.replacen(
        &from,
        &format!("entityType.{}", disambiguate_name(module, entity)),
        1,
    ))
}

/// Inverse of reconciliation, for writing keys back to a module's files:
/// `entityType.mod_foo__entity.field` → `fqm.entityType.entity.field`.
pub fn unmarshal_label_key(key: &str) -> String {
    let Some(rest) = key.strip_prefix("entityType.") else {
        return format!("{}{}", EXTERNAL_PREFIX, key);
    };
    let (entity, tail) = match rest.split_once('.') {
        Some((entity, tail)) => (entity, Some(tail)),
        None => (rest, None),
    };
    let entity = entity.split_once("__").map_or(entity, |(_, e)| e);
    match tail {
        Some(tail) => format!("fqm.entityType.{}.{}", entity, tail),
        None => format!("fqm.entityType.{}", entity),
    }
}

/// Report inferred keys a module does not provide.
pub fn missing_labels(inferred: &LabelMap, provided: &LabelMap) -> Option<Issue> {
    let missing: Vec<String> = inferred
        .keys()
        .filter(|key| !provided.contains_key(*key))
        .cloned()
        .collect();

    if missing.is_empty() {
        return None;
    }

    Some(Issue::new(
        Severity::Warning,
        IssueKind::LabelsMissing {
            keys: missing.clone(),
        },
        format!("{} translations missing: {}", missing.len(), missing.join(", ")),
    ))
}

/// Inferred defaults overlaid by provided labels.
pub fn merge_locale(inferred: &LabelMap, provided: &LabelMap) -> LabelMap {
    let mut merged = inferred.clone();
    for (key, value) in provided {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
