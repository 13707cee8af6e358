//! # Report Generator
//!
//! Deduplicates the run's issue list and renders it as a Markdown report
//! and a JSON document. The comparator emits issues in observation order
//! with no dedup of its own; everything presentation-related lives here.
//!
//! Dedup key: `(schema, path, kind, expected, actual)`. Summary counts
//! per kind use distinct `(schema, path)` sites, so an issue repeated
//! across sampled list items counts once.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;
use serde_json::json;

use apidrift_schema::{Issue, IssueKind};

use crate::run::{RunOutcome, RunStatus};

/// Markdown report filename.
pub const MARKDOWN_REPORT_FILE: &str = "api-validation-report.md";
/// JSON report filename.
pub const JSON_REPORT_FILE: &str = "api-validation-report.json";

/// Characters of an example value shown in Markdown tables.
const EXAMPLE_VALUE_LEN: usize = 40;
/// Characters of an error message shown in the endpoints table.
const ERROR_DISPLAY_LEN: usize = 30;

type DedupKey<'a> = (&'a str, IssueKind, Option<&'a str>, &'a str);

/// Write both reports under `output_dir`, creating it as needed.
/// Returns the Markdown and JSON paths.
pub fn write_reports(
    outcome: &RunOutcome,
    output_dir: &Path,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    let generated = chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

    let markdown_path = output_dir.join(MARKDOWN_REPORT_FILE);
    std::fs::write(&markdown_path, render_markdown(outcome, &generated))
        .with_context(|| format!("cannot write {}", markdown_path.display()))?;

    let json_path = output_dir.join(JSON_REPORT_FILE);
    let report = render_json(outcome, &generated);
    let pretty = serde_json::to_string_pretty(&report).context("cannot serialize JSON report")?;
    std::fs::write(&json_path, pretty)
        .with_context(|| format!("cannot write {}", json_path.display()))?;

    Ok((markdown_path, json_path))
}

/// Render the JSON report document.
pub fn render_json(outcome: &RunOutcome, generated: &str) -> serde_json::Value {
    let mut issues_by_type = serde_json::Map::new();
    for kind in IssueKind::ALL {
        issues_by_type.insert(
            kind.as_str().to_string(),
            json!(count_sites(&outcome.issues, kind)),
        );
    }

    json!({
        "generated": generated,
        "summary": {
            "endpoints_tested": outcome.results.len(),
            "successful": count_status(outcome, RunStatus::Ok),
            "failed": count_status(outcome, RunStatus::Error),
            "unique_issues": unique_issue_count(&outcome.issues),
        },
        "issues_by_type": issues_by_type,
        "results": outcome.results,
        "issues": outcome.issues,
    })
}

/// Render the Markdown report.
pub fn render_markdown(outcome: &RunOutcome, generated: &str) -> String {
    let deduped = dedup_by_schema(&outcome.issues);
    let error_count = count_status(outcome, RunStatus::Error);

    let mut lines: Vec<String> = vec![
        "# API Spec Validation Report".to_string(),
        String::new(),
        format!("Generated: {generated}"),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- **Endpoints tested:** {}", outcome.results.len()),
        format!("- **Successful:** {}", count_status(outcome, RunStatus::Ok)),
        format!("- **Failed to fetch:** {error_count}"),
        format!(
            "- **Unique schema issues:** {}",
            unique_issue_count(&outcome.issues)
        ),
        String::new(),
        "### Issues by Type".to_string(),
        String::new(),
        "| Type | Count |".to_string(),
        "|------|-------|".to_string(),
    ];
    for kind in IssueKind::ALL {
        lines.push(format!(
            "| {} | {} |",
            kind_label(kind),
            count_sites(&outcome.issues, kind)
        ));
    }
    lines.push(String::new());

    if error_count > 0 {
        lines.push("## Connection Errors".to_string());
        lines.push(String::new());
        for result in &outcome.results {
            if result.status == RunStatus::Error {
                let message = result.error.as_deref().unwrap_or("unknown error");
                lines.push(format!("- `{}`: {}", result.path, message));
            }
        }
        lines.push(String::new());
    }

    render_type_mismatches(&mut lines, &deduped);
    render_extra_fields(&mut lines, &deduped);
    render_missing_required(&mut lines, &deduped);

    lines.push("## Endpoints Tested".to_string());
    lines.push(String::new());
    lines.push("| Endpoint | Schema | Status |".to_string());
    lines.push("|----------|--------|--------|".to_string());
    for result in &outcome.results {
        let status = match result.status {
            RunStatus::Error => {
                let message = result.error.as_deref().unwrap_or("unknown error");
                let cut: String = message.chars().take(ERROR_DISPLAY_LEN).collect();
                format!("error: {cut}")
            }
            RunStatus::Ok => match result.issues {
                Some(n) if n > 0 => format!("{n} issues"),
                _ => "ok".to_string(),
            },
        };
        lines.push(format!("| `{}` | {} | {} |", result.path, result.schema, status));
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Type mismatches break deserialization on the client side, so they lead
/// the report.
fn render_type_mismatches(
    lines: &mut Vec<String>,
    deduped: &BTreeMap<&str, BTreeMap<DedupKey<'_>, &Issue>>,
) {
    if !has_kind(deduped, IssueKind::TypeMismatch) {
        return;
    }
    lines.push("## Type Mismatches (Critical)".to_string());
    lines.push(String::new());
    lines.push(
        "These fields have incorrect types in the spec and will cause deserialization failures."
            .to_string(),
    );
    lines.push(String::new());

    for (schema_name, issues) in deduped {
        let mismatches: Vec<&&Issue> = issues
            .values()
            .filter(|i| i.kind == IssueKind::TypeMismatch)
            .collect();
        if mismatches.is_empty() {
            continue;
        }

        lines.push(format!("### {schema_name}"));
        lines.push(String::new());
        lines.push("| Field | Spec Type | Actual Type | Example Value |".to_string());
        lines.push("|-------|-----------|-------------|---------------|".to_string());
        for issue in mismatches {
            let field = display_path(&issue.path);
            let expected = issue.expected.as_deref().unwrap_or("-");
            let value = display_value(issue.value.as_deref().unwrap_or(""));
            lines.push(format!(
                "| `{field}` | {expected} | {} | `{value}` |",
                issue.actual
            ));
        }
        lines.push(String::new());
    }
}

/// Extra fields are informational: the spec may simply be behind the
/// server.
fn render_extra_fields(
    lines: &mut Vec<String>,
    deduped: &BTreeMap<&str, BTreeMap<DedupKey<'_>, &Issue>>,
) {
    if !has_kind(deduped, IssueKind::ExtraField) {
        return;
    }
    lines.push("## Extra Fields (Spec Missing)".to_string());
    lines.push(String::new());
    lines.push("These fields appear in API responses but are not defined in the spec.".to_string());
    lines.push(String::new());

    for (schema_name, issues) in deduped {
        let extras: Vec<&&Issue> = issues
            .values()
            .filter(|i| i.kind == IssueKind::ExtraField)
            .collect();
        if extras.is_empty() {
            continue;
        }

        lines.push(format!("### {schema_name}"));
        lines.push(String::new());
        lines.push("| Field | Actual Type | Example Value |".to_string());
        lines.push("|-------|-------------|---------------|".to_string());

        let mut seen_paths = BTreeSet::new();
        for issue in extras {
            let field = display_path(&issue.path);
            if !seen_paths.insert(field.clone()) {
                continue;
            }
            let value = display_value(issue.value.as_deref().unwrap_or(""));
            lines.push(format!("| `{field}` | {} | `{value}` |", issue.actual));
        }
        lines.push(String::new());
    }
}

fn render_missing_required(
    lines: &mut Vec<String>,
    deduped: &BTreeMap<&str, BTreeMap<DedupKey<'_>, &Issue>>,
) {
    if !has_kind(deduped, IssueKind::MissingRequired) {
        return;
    }
    lines.push("## Missing Required Fields".to_string());
    lines.push(String::new());
    lines.push("These fields are marked required in spec but missing from responses.".to_string());
    lines.push(String::new());

    for (schema_name, issues) in deduped {
        let missing: Vec<&&Issue> = issues
            .values()
            .filter(|i| i.kind == IssueKind::MissingRequired)
            .collect();
        if missing.is_empty() {
            continue;
        }

        lines.push(format!("### {schema_name}"));
        lines.push(String::new());

        let mut seen_paths = BTreeSet::new();
        for issue in missing {
            let field = display_path(&issue.path);
            if !seen_paths.insert(field.clone()) {
                continue;
            }
            let expected = issue.expected.as_deref().unwrap_or("unknown");
            lines.push(format!("- `{field}` (expected: {expected})"));
        }
        lines.push(String::new());
    }
}

/// Dedup issues per schema by `(path, kind, expected, actual)`.
fn dedup_by_schema(issues: &[Issue]) -> BTreeMap<&str, BTreeMap<DedupKey<'_>, &Issue>> {
    let mut by_schema: BTreeMap<&str, BTreeMap<DedupKey<'_>, &Issue>> = BTreeMap::new();
    for issue in issues {
        let key: DedupKey<'_> = (
            issue.path.as_str(),
            issue.kind,
            issue.expected.as_deref(),
            issue.actual.as_str(),
        );
        by_schema
            .entry(issue.schema.as_str())
            .or_default()
            .entry(key)
            .or_insert(issue);
    }
    by_schema
}

fn has_kind(deduped: &BTreeMap<&str, BTreeMap<DedupKey<'_>, &Issue>>, kind: IssueKind) -> bool {
    deduped
        .values()
        .flat_map(|issues| issues.values())
        .any(|i| i.kind == kind)
}

/// Total number of deduplicated issues.
fn unique_issue_count(issues: &[Issue]) -> usize {
    dedup_by_schema(issues)
        .values()
        .map(|per_schema| per_schema.len())
        .sum()
}

/// Distinct `(schema, path)` sites reporting the given kind.
fn count_sites(issues: &[Issue], kind: IssueKind) -> usize {
    issues
        .iter()
        .filter(|i| i.kind == kind)
        .map(|i| (i.schema.as_str(), i.path.as_str()))
        .collect::<BTreeSet<_>>()
        .len()
}

fn count_status(outcome: &RunOutcome, status: RunStatus) -> usize {
    outcome
        .results
        .iter()
        .filter(|r| r.status == status)
        .count()
}

fn kind_label(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::TypeMismatch => "Type mismatch",
        IssueKind::ExtraField => "Extra field (in response, not in spec)",
        IssueKind::MissingRequired => "Missing required field",
        IssueKind::MissingOptional => "Missing optional field",
        IssueKind::EnumMismatch => "Enum value mismatch",
        IssueKind::UnexpectedNull => "Unexpected null",
    }
}

/// Strip `[N]` array indices and leading dots for display: issues at
/// different sampled indices collapse onto one field locator.
fn display_path(path: &str) -> String {
    static INDEX_RE: OnceLock<Regex> = OnceLock::new();
    let re = INDEX_RE.get_or_init(|| Regex::new(r"\[\d+\]").expect("index pattern is valid"));
    re.replace_all(path.trim_start_matches('.'), "")
        .trim_start_matches('.')
        .to_string()
}

/// Escape pipes and cut example values for table cells.
fn display_value(value: &str) -> String {
    value.replace('|', "\\|").chars().take(EXAMPLE_VALUE_LEN).collect()
}
