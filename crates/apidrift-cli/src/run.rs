//! # Validation run
//!
//! Sequential walk of the endpoint catalog: discover IDs, then fetch and
//! validate one endpoint at a time. Fetch failures and missing schemas
//! become error results; schema drift becomes issues. Nothing here aborts
//! the run.
//!
//! Progress lines go to stdout (the CLI is a reporting tool and its
//! stdout is part of its interface); diagnostics go to `tracing`.

use std::io::Write as _;

use serde::Serialize;
use serde_json::Value;

use apidrift_client::{discover_ids, ApiClient, Endpoint};
use apidrift_schema::{Comparator, Issue, IssueLog, SchemaIndex};

/// Items of a top-level list response validated per endpoint.
pub const LIST_SAMPLE_CAP: usize = 5;

/// Whether an endpoint was fetched and validated or failed before
/// validation could run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Error,
}

/// Per-endpoint outcome record.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointResult {
    /// The materialized path that was (or would have been) fetched.
    pub path: String,
    /// Name of the schema the response was checked against.
    pub schema: String,
    /// Fetch/validation status.
    pub status: RunStatus,
    /// Number of issues this endpoint contributed, when validated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<usize>,
    /// Classified error message, when the endpoint failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EndpointResult {
    fn ok(path: String, schema: &str, issues: usize) -> Self {
        Self {
            path,
            schema: schema.to_string(),
            status: RunStatus::Ok,
            issues: Some(issues),
            error: None,
        }
    }

    fn error(path: String, schema: &str, message: String) -> Self {
        Self {
            path,
            schema: schema.to_string(),
            status: RunStatus::Error,
            issues: None,
            error: Some(message),
        }
    }
}

/// Everything a run produces: per-endpoint results in catalog order and
/// the ordered issue list.
#[derive(Debug)]
pub struct RunOutcome {
    /// One record per catalog endpoint, in probe order.
    pub results: Vec<EndpointResult>,
    /// Every issue observed, in emission order (deduplication is the
    /// report generator's job).
    pub issues: Vec<Issue>,
}

/// Execute one validation run over the given catalog.
pub async fn execute(
    client: &ApiClient,
    index: &SchemaIndex,
    endpoints: &[Endpoint],
) -> RunOutcome {
    println!("Discovering IDs from list endpoints...");
    let ids = discover_ids(client, endpoints).await;
    for (source, found) in ids.iter() {
        let rendered: Vec<String> = found.iter().map(|v| v.to_string()).collect();
        println!("  {source}: [{}]", rendered.join(", "));
    }
    println!();

    let comparator = Comparator::new(index);
    let mut log = IssueLog::new();
    let mut results = Vec::with_capacity(endpoints.len());

    println!("Testing {} endpoints...", endpoints.len());
    for endpoint in endpoints {
        let path = match endpoint.id_source {
            Some(source) => match ids.first_for(source.list_path) {
                Some(id) => endpoint.materialize(id),
                None => {
                    println!(
                        "  {} ... SKIP (no IDs from {})",
                        endpoint.path, source.list_path
                    );
                    results.push(EndpointResult::error(
                        endpoint.path.to_string(),
                        endpoint.schema,
                        format!("No IDs discovered from {}", source.list_path),
                    ));
                    continue;
                }
            },
            None => endpoint.path.to_string(),
        };

        print!("  {path} ... ");
        let _ = std::io::stdout().flush();

        let data = match client.fetch(&path).await {
            Ok(data) => data,
            Err(e) => {
                println!("ERROR: {e}");
                results.push(EndpointResult::error(path, endpoint.schema, e.to_string()));
                continue;
            }
        };

        let Some(node) = index.get(endpoint.schema) else {
            println!("SKIP (schema not found: {})", endpoint.schema);
            results.push(EndpointResult::error(
                path,
                endpoint.schema,
                format!("Schema not found: {}", endpoint.schema),
            ));
            continue;
        };

        let issues_before = log.len();

        match data.as_array() {
            Some(items) if endpoint.response_is_list => {
                for (i, item) in items.iter().take(LIST_SAMPLE_CAP).enumerate() {
                    comparator.compare(item, node, &format!("[{i}]"), endpoint.schema, true, &mut log);
                }
            }
            _ => comparator.compare(&data, node, "", endpoint.schema, true, &mut log),
        }

        let new_issues = log.len() - issues_before;
        if new_issues > 0 {
            println!("ISSUES: {new_issues}");
        } else {
            println!("OK");
        }
        results.push(EndpointResult::ok(path, endpoint.schema, new_issues));
    }

    println!();
    println!("Total issues found: {}", log.len());

    RunOutcome {
        results,
        issues: log.into_inner(),
    }
}
