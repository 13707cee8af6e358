//! # Issue Model
//!
//! Structured mismatch records and the run-scoped accumulator they land in.
//!
//! Issues are append-only observations: once pushed they are never mutated.
//! The [`IssueLog`] is owned by the run loop and passed `&mut` into every
//! recursive comparator call, so issue accumulation is explicit rather
//! than a side effect on shared state.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Maximum characters of a value embedded into an issue record.
const VALUE_TRUNCATE_LEN: usize = 50;

/// Classification of a single schema mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The value's basic type differs from the declared type.
    TypeMismatch,
    /// A field present in the response is not declared in the schema.
    ExtraField,
    /// A field marked `required` is absent from the response.
    MissingRequired,
    /// An optional, non-nullable field is absent from the response.
    /// Informational: a hint that the schema's optionality and the
    /// server's behavior disagree, not a contract violation.
    MissingOptional,
    /// A string value is outside the declared `enum` set.
    EnumMismatch,
    /// A null value where the schema is not marked `nullable`.
    UnexpectedNull,
}

impl IssueKind {
    /// All kinds, in report order.
    pub const ALL: [IssueKind; 6] = [
        IssueKind::TypeMismatch,
        IssueKind::ExtraField,
        IssueKind::MissingRequired,
        IssueKind::MissingOptional,
        IssueKind::EnumMismatch,
        IssueKind::UnexpectedNull,
    ];

    /// The snake_case wire name, as serialized into the JSON report.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::TypeMismatch => "type_mismatch",
            IssueKind::ExtraField => "extra_field",
            IssueKind::MissingRequired => "missing_required",
            IssueKind::MissingOptional => "missing_optional",
            IssueKind::EnumMismatch => "enum_mismatch",
            IssueKind::UnexpectedNull => "unexpected_null",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed mismatch between a response value and its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Name of the schema being checked when the mismatch was observed.
    /// Ref resolution switches this to the referenced schema's own name,
    /// so nested issues are attributed to the type actually being checked.
    pub schema: String,
    /// Dotted/bracketed locator from the validation root, e.g.
    /// `.units[2].name`. The empty path renders as `(root)`.
    pub path: String,
    /// Mismatch classification.
    #[serde(rename = "issue")]
    pub kind: IssueKind,
    /// What the schema declared, when the mismatch has an expectation.
    pub expected: Option<String>,
    /// What the response actually contained.
    pub actual: String,
    /// Truncated rendering of the offending value, when one exists.
    pub value: Option<String>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}", self.schema, self.kind, self.path)?;
        if let Some(expected) = &self.expected {
            write!(f, " (expected {}, got {})", expected, self.actual)?;
        }
        Ok(())
    }
}

/// Run-scoped, order-preserving issue accumulator.
#[derive(Debug, Default)]
pub struct IssueLog {
    issues: Vec<Issue>,
}

impl IssueLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue. Issues are never removed or reordered.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Number of issues recorded so far.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true if no issues have been recorded.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Iterate the recorded issues in order.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    /// Consume the log and return the issues in order.
    pub fn into_inner(self) -> Vec<Issue> {
        self.issues
    }
}

/// Render a value for embedding into an issue record: raw string content
/// for strings, compact JSON otherwise, cut to 50 characters with a
/// trailing `...` marker when cut.
pub(crate) fn truncate_value(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if rendered.chars().count() > VALUE_TRUNCATE_LEN {
        let cut: String = rendered.chars().take(VALUE_TRUNCATE_LEN).collect();
        format!("{cut}...")
    } else {
        rendered
    }
}
