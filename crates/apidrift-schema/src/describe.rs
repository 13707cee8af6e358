//! # Type Classifier
//!
//! Short descriptive labels for schema nodes and runtime values. These
//! labels appear verbatim in issue records and the rendered reports, so
//! their grammar is stable: `array<Player>`, `enum[4 values]`,
//! `object<string, Unit>`, `integer`, `array<empty>`.

use serde_json::Value;

use crate::index::{AdditionalProperties, SchemaNode};

/// Describe a schema node.
///
/// A `$ref` describes as the referenced schema's name (the last path
/// segment, without resolving). An `enum` describes by cardinality.
/// Arrays and maps recurse into their element schema. A node with no
/// recognized type describes as `unknown`.
pub fn describe_schema(node: &SchemaNode) -> String {
    if let Some(reference) = &node.reference {
        return reference
            .rsplit('/')
            .next()
            .unwrap_or(reference)
            .to_string();
    }
    if let Some(values) = &node.enum_values {
        return format!("enum[{} values]", values.len());
    }
    match node.node_type.as_deref() {
        Some("array") => {
            let inner = node
                .items
                .as_deref()
                .map(describe_schema)
                .unwrap_or_else(|| "unknown".to_string());
            format!("array<{inner}>")
        }
        Some("object") => match &node.additional_properties {
            Some(AdditionalProperties::Schema(entry)) => {
                format!("object<string, {}>", describe_schema(entry))
            }
            _ => "object".to_string(),
        },
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

/// Infer the basic type label of a runtime value.
///
/// Booleans are a distinct `serde_json::Value` variant, so they can never
/// be misreported as integers here; the comparator separately enforces
/// that a boolean never satisfies an integer or number schema. An array
/// describes by its first element, or `array<empty>` when empty.
pub fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer".to_string()
            } else {
                "number".to_string()
            }
        }
        Value::String(_) => "string".to_string(),
        Value::Array(items) => match items.first() {
            Some(first) => format!("array<{}>", describe_value(first)),
            None => "array<empty>".to_string(),
        },
        Value::Object(_) => "object".to_string(),
    }
}
