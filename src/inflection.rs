//! Shared string inflection utilities.
//!
//! Column names, entity type names and default labels are all derived from
//! schema keys and module names through these helpers, so their output is
//! part of the artifact contract: existing label files are keyed by it.
//!
//! Words are split at lower/digit → upper transitions and before the last
//! capital of an acronym run (`ISBNNumber` → `ISBN`, `Number`). Digits stay
//! attached to the word they follow (`addressLine1` → `address`, `Line1`).
//! Any run of characters that are neither letters nor ASCII digits
//! separates words and is dropped.

use regex::Regex;
use std::sync::LazyLock;

static LOWER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\p{Ll}0-9])(\p{Lu})").unwrap());
static UPPER_UPPER_LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Lu})(\p{Lu}\p{Ll})").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}0-9]+").unwrap());

const BOUNDARY: &str = "${1}\u{0}${2}";

/// Split a key into its words, in order.
fn words(input: &str) -> Vec<String> {
    let marked = LOWER_UPPER.replace_all(input.trim(), BOUNDARY);
    let marked = UPPER_UPPER_LOWER.replace_all(&marked, BOUNDARY);
    SEPARATORS
        .split(&marked)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert a schema key or module name to an identifier-safe snake case name.
///
/// # Examples
/// ```ignore
/// assert_eq!(snake_case("deptId"), "dept_id");
/// assert_eq!(snake_case("mod-users"), "mod_users");
/// ```
pub fn snake_case(word: &str) -> String {
    words(word)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert a name to a sentence-cased label: the first word capitalized,
/// every other word lower case.
pub fn sentence_case(word: &str) -> String {
    words(word)
        .iter()
        .enumerate()
        .map(|(i, w)| if i == 0 { capitalize(w) } else { w.to_lowercase() })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Globally unique entity type name: `<snake_cased_module>__<resource>`.
pub fn disambiguate_name(module: &str, resource: &str) -> String {
    format!("{}__{}", snake_case(module), resource)
}
