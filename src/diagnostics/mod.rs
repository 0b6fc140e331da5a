//! Non-fatal issues collected during compilation.
//!
//! Issues are values, not errors: a compilation that produced an artifact can
//! still carry warnings the caller is expected to surface. Fatal problems are
//! [`crate::compile::CompileError`]s instead.

use serde::Serialize;
use std::fmt;

use crate::config::ModuleMetadata;

/// Severity of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What part of compilation an issue came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IssueKind {
    /// Schema or field level problem (unknown type, unknown extension, ...)
    Schema,
    /// A join that could not be resolved as written
    Join {
        #[serde(rename = "fieldName")]
        field_name: String,
        target: String,
        #[serde(rename = "targetField")]
        target_field: String,
        missing: JoinMissing,
    },
    /// Labels supplied externally that no entity type expects
    LabelsExtra { keys: Vec<String> },
    /// Labels inferred but not supplied externally
    LabelsMissing { keys: Vec<String> },
    /// Module configuration problem
    Config,
}

/// Which half of a join target was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMissing {
    Entity,
    Field,
}

impl fmt::Display for JoinMissing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinMissing::Entity => write!(f, "entity"),
            JoinMissing::Field => write!(f, "field"),
        }
    }
}

/// One accumulated issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    pub fn new(severity: Severity, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
        }
    }

    /// A schema warning, the common case for inference issues.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, IssueKind::Schema, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Short human-readable title for the issue kind.
    pub fn title(&self) -> &'static str {
        match self.kind {
            IssueKind::Schema => "Schema issue",
            IssueKind::Join { .. } => "Unable to resolve join",
            IssueKind::LabelsExtra { .. } => "Extra translations found",
            IssueKind::LabelsMissing { .. } => "Missing translations",
            IssueKind::Config => "Configuration issue",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.message)
    }
}

// ============================================================================
// Attribution
// ============================================================================

/// An issue attributed to the resource and module it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    #[serde(flatten)]
    pub issue: Issue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type_name: Option<String>,
    pub metadata: Option<ModuleMetadata>,
}

impl Diagnostic {
    pub fn new(issue: Issue) -> Self {
        Self {
            issue,
            entity_type_name: None,
            metadata: None,
        }
    }

    pub fn for_entity(mut self, name: impl Into<String>) -> Self {
        self.entity_type_name = Some(name.into());
        self
    }

    pub fn in_module(mut self, metadata: &ModuleMetadata) -> Self {
        self.metadata = Some(metadata.clone());
        self
    }

    pub fn severity(&self) -> Severity {
        self.issue.severity
    }

    /// Render as a GitHub Actions workflow command, e.g.
    /// `::error title=Unable to resolve join::<message>`.
    pub fn github_annotation(&self) -> String {
        let level = match self.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "notice",
        };
        let mut title = self.issue.title().to_string();
        if let Some(name) = &self.entity_type_name {
            title = format!("{} in {}", title, name);
        }
        format!(
            "::{} title={}::{}",
            level,
            escape_property(&title),
            escape_data(&self.issue.message)
        )
    }
}

fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(text: &str) -> String {
    escape_data(text).replace(':', "%3A").replace(',', "%2C")
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(metadata) = &self.metadata {
            write!(
                f,
                "[{}->{} (team {})] ",
                metadata.domain, metadata.module, metadata.team
            )?;
        }
        write!(f, "{}", self.issue.title())?;
        if let Some(name) = &self.entity_type_name {
            write!(f, " in {}", name)?;
        }
        write!(f, ": {}", self.issue.message)
    }
}

/// Count diagnostics at or above `severity`.
pub fn count_at_least(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity() >= severity)
        .count()
}
