//! ID discovery for dynamic path templates.
//!
//! Fetches each distinct identifier source named by the catalog once and
//! extracts up to [`MAX_IDS_PER_SOURCE`] sample identifiers. Sources that
//! fail to fetch or yield nothing are simply absent from the result; the
//! run loop reports the affected dynamic endpoints as skipped.

use std::collections::HashMap;

use serde_json::Value;

use crate::catalog::{Endpoint, IdSource};
use crate::fetch::ApiClient;

/// Sample identifiers extracted per source.
pub const MAX_IDS_PER_SOURCE: usize = 3;

/// Identifiers discovered from list endpoints, keyed by source path.
#[derive(Debug, Default)]
pub struct DiscoveredIds {
    ids: HashMap<String, Vec<Value>>,
}

impl DiscoveredIds {
    /// All identifiers discovered for a source path.
    pub fn get(&self, list_path: &str) -> Option<&[Value]> {
        self.ids.get(list_path).map(|v| v.as_slice())
    }

    /// The first identifier discovered for a source path, used to
    /// materialize that source's dynamic endpoints.
    pub fn first_for(&self, list_path: &str) -> Option<&Value> {
        self.ids.get(list_path).and_then(|v| v.first())
    }

    /// Iterate (source path, identifiers) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.ids.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of sources that yielded identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no source yielded identifiers.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Fetch every distinct identifier source in the catalog and extract
/// sample identifiers.
pub async fn discover_ids(client: &ApiClient, endpoints: &[Endpoint]) -> DiscoveredIds {
    let mut ids: HashMap<String, Vec<Value>> = HashMap::new();

    for source in distinct_sources(endpoints) {
        let data = match client.fetch(source.list_path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(path = source.list_path, error = %e, "id discovery fetch failed");
                continue;
            }
        };

        let data = unwrap_page(data);
        let Some(items) = data.as_array() else {
            tracing::debug!(path = source.list_path, "id source did not return a list");
            continue;
        };

        let extracted: Vec<Value> = items
            .iter()
            .take(MAX_IDS_PER_SOURCE)
            .filter_map(|item| item.get(source.id_field).cloned())
            .collect();

        if !extracted.is_empty() {
            ids.insert(source.list_path.to_string(), extracted);
        }
    }

    DiscoveredIds { ids }
}

/// Distinct identifier sources in catalog order.
fn distinct_sources(endpoints: &[Endpoint]) -> Vec<IdSource> {
    let mut sources: Vec<IdSource> = Vec::new();
    for endpoint in endpoints {
        if let Some(source) = endpoint.id_source {
            if !sources.iter().any(|s| s.list_path == source.list_path) {
                sources.push(source);
            }
        }
    }
    sources
}

/// Unwrap the paginated tiles envelope: `{"tiles": [...]}` becomes the
/// inner list; anything else passes through.
fn unwrap_page(data: Value) -> Value {
    match data {
        Value::Object(mut map) if map.contains_key("tiles") => {
            map.remove("tiles").unwrap_or(Value::Null)
        }
        other => other,
    }
}
