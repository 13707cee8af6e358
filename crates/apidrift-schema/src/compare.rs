//! # Structural Comparator
//!
//! Recursive, depth-first comparison of a decoded JSON value against a
//! schema node. Every mismatch appends an [`Issue`]; the walk itself never
//! fails and never stops early except where the schema says there is
//! nothing further to check (null values, type mismatches on containers).
//!
//! Array validation is deliberately bounded: only the first
//! [`ARRAY_SAMPLE_CAP`] elements of any array are visited, keeping runs
//! fast and reports readable on arbitrarily long payloads.

use serde_json::Value;

use crate::describe::{describe_schema, describe_value};
use crate::index::{AdditionalProperties, SchemaIndex, SchemaNode};
use crate::issue::{truncate_value, Issue, IssueKind, IssueLog};

/// Elements of an array visited per validation.
pub const ARRAY_SAMPLE_CAP: usize = 10;

/// Recursive schema-vs-value comparator over a loaded [`SchemaIndex`].
#[derive(Debug, Clone, Copy)]
pub struct Comparator<'a> {
    index: &'a SchemaIndex,
}

impl<'a> Comparator<'a> {
    /// Create a comparator over the given index.
    pub fn new(index: &'a SchemaIndex) -> Self {
        Self { index }
    }

    /// Compare `value` against `node`, appending one issue per mismatch.
    ///
    /// `path` locates `value` relative to the validation root (empty at the
    /// root). `schema_name` attributes issues to the named type being
    /// checked; ref resolution replaces it with the referenced schema's own
    /// name. `check_missing` gates the missing-field checks (required and
    /// optional) so callers can disable that secondary category while still
    /// reporting primary mismatches.
    pub fn compare(
        &self,
        value: &Value,
        node: &SchemaNode,
        path: &str,
        schema_name: &str,
        check_missing: bool,
        log: &mut IssueLog,
    ) {
        // A ref node defers entirely to the referenced schema. Unresolvable
        // refs (external or unknown) are silently skipped.
        if let Some(reference) = &node.reference {
            if let Some((ref_name, resolved)) = self.index.resolve_ref(reference) {
                self.compare(value, resolved, path, ref_name, check_missing, log);
            }
            return;
        }

        if value.is_null() {
            if !node.nullable {
                log.push(Issue {
                    schema: schema_name.to_string(),
                    path: issue_path(path),
                    kind: IssueKind::UnexpectedNull,
                    expected: node.node_type.clone(),
                    actual: "null".to_string(),
                    value: None,
                });
            }
            return;
        }

        match node.node_type.as_deref() {
            Some("object") => {
                self.compare_object(value, node, path, schema_name, check_missing, log)
            }
            Some("array") => self.compare_array(value, node, path, schema_name, check_missing, log),
            Some("string") => compare_string(value, node, path, schema_name, log),
            Some("integer") => {
                if value.as_i64().is_none() && value.as_u64().is_none() {
                    log.push(type_mismatch(schema_name, path, "integer", value));
                }
            }
            Some("number") => {
                if !value.is_number() {
                    log.push(type_mismatch(schema_name, path, "number", value));
                }
            }
            Some("boolean") => {
                if !value.is_boolean() {
                    log.push(type_mismatch(schema_name, path, "boolean", value));
                }
            }
            // Unrecognized or absent declared type: accepted as-is.
            _ => {}
        }
    }

    fn compare_object(
        &self,
        value: &Value,
        node: &SchemaNode,
        path: &str,
        schema_name: &str,
        check_missing: bool,
        log: &mut IssueLog,
    ) {
        let Some(map) = value.as_object() else {
            log.push(type_mismatch(schema_name, path, "object", value));
            return;
        };

        match &node.additional_properties {
            // Homogeneous map: entries validate against the entry schema
            // under the container's identity (map entries are not named
            // types).
            Some(AdditionalProperties::Schema(entry_node)) => {
                for (key, entry) in map {
                    self.compare(
                        entry,
                        entry_node,
                        &format!("{path}.{key}"),
                        schema_name,
                        check_missing,
                        log,
                    );
                }
            }
            // Open map with no entry schema: nothing to check.
            Some(AdditionalProperties::Allowed(true)) => {}
            // Closed object.
            Some(AdditionalProperties::Allowed(false)) | None => {
                for (key, entry) in map {
                    if let Some(prop) = node.properties.get(key) {
                        self.compare(
                            entry,
                            prop,
                            &format!("{path}.{key}"),
                            schema_name,
                            check_missing,
                            log,
                        );
                    } else {
                        log.push(Issue {
                            schema: schema_name.to_string(),
                            path: format!("{path}.{key}"),
                            kind: IssueKind::ExtraField,
                            expected: None,
                            actual: describe_value(entry),
                            value: Some(truncate_value(entry)),
                        });
                    }
                }

                if check_missing {
                    for field in &node.required {
                        if !map.contains_key(field) {
                            let described = node
                                .properties
                                .get(field)
                                .map(describe_schema)
                                .unwrap_or_else(|| "unknown".to_string());
                            log.push(Issue {
                                schema: schema_name.to_string(),
                                path: format!("{path}.{field}"),
                                kind: IssueKind::MissingRequired,
                                expected: Some(described),
                                actual: "missing".to_string(),
                                value: None,
                            });
                        }
                    }

                    // Optional, non-nullable fields absent from the value:
                    // informational signal that the declared optionality and
                    // the server's behavior disagree.
                    for (field, prop) in &node.properties {
                        if !map.contains_key(field)
                            && !node.required.iter().any(|r| r == field)
                            && !prop.nullable
                        {
                            log.push(Issue {
                                schema: schema_name.to_string(),
                                path: format!("{path}.{field}"),
                                kind: IssueKind::MissingOptional,
                                expected: Some(describe_schema(prop)),
                                actual: "missing".to_string(),
                                value: None,
                            });
                        }
                    }
                }
            }
        }
    }

    fn compare_array(
        &self,
        value: &Value,
        node: &SchemaNode,
        path: &str,
        schema_name: &str,
        check_missing: bool,
        log: &mut IssueLog,
    ) {
        let Some(items) = value.as_array() else {
            log.push(type_mismatch(schema_name, path, "array", value));
            return;
        };

        let empty = SchemaNode::default();
        let item_node = node.items.as_deref().unwrap_or(&empty);
        for (i, item) in items.iter().take(ARRAY_SAMPLE_CAP).enumerate() {
            self.compare(
                item,
                item_node,
                &format!("{path}[{i}]"),
                schema_name,
                check_missing,
                log,
            );
        }
    }
}

fn compare_string(
    value: &Value,
    node: &SchemaNode,
    path: &str,
    schema_name: &str,
    log: &mut IssueLog,
) {
    let Some(text) = value.as_str() else {
        log.push(type_mismatch(schema_name, path, "string", value));
        return;
    };

    if let Some(allowed) = &node.enum_values {
        if !allowed.iter().any(|v| v.as_str() == Some(text)) {
            log.push(Issue {
                schema: schema_name.to_string(),
                path: issue_path(path),
                kind: IssueKind::EnumMismatch,
                expected: Some(format!("one of {} enum values", allowed.len())),
                actual: format!("\"{text}\""),
                value: Some(truncate_value(value)),
            });
        }
    }
}

fn type_mismatch(schema_name: &str, path: &str, expected: &str, value: &Value) -> Issue {
    Issue {
        schema: schema_name.to_string(),
        path: issue_path(path),
        kind: IssueKind::TypeMismatch,
        expected: Some(expected.to_string()),
        actual: describe_value(value),
        value: Some(truncate_value(value)),
    }
}

fn issue_path(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(spec: Value) -> SchemaNode {
        serde_json::from_value(spec).unwrap()
    }

    fn empty_index() -> SchemaIndex {
        SchemaIndex::from_yaml_str("openapi: \"3.0.3\"").unwrap()
    }

    /// Run a comparison against a standalone node and collect the issues.
    fn check(value: Value, spec: Value) -> Vec<Issue> {
        check_with(&empty_index(), value, spec)
    }

    fn check_with(index: &SchemaIndex, value: Value, spec: Value) -> Vec<Issue> {
        let mut log = IssueLog::new();
        Comparator::new(index).compare(&value, &node(spec), "", "Test", true, &mut log);
        log.into_inner()
    }

    #[test]
    fn conforming_object_yields_no_issues() {
        let issues = check(
            json!({"id": 3, "name": "Assur"}),
            json!({
                "type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
            }),
        );
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn undeclared_key_yields_exactly_one_extra_field() {
        let issues = check(
            json!({"id": 1, "surprise": [1, 2]}),
            json!({
                "type": "object",
                "properties": {"id": {"type": "integer"}, "name": {"type": "string", "nullable": true}}
            }),
        );
        let extras: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::ExtraField)
            .collect();
        assert_eq!(extras.len(), 1);
        assert_eq!(extras[0].path, ".surprise");
        assert_eq!(extras[0].expected, None);
        assert_eq!(extras[0].actual, "array<integer>");
        assert_eq!(extras[0].value.as_deref(), Some("[1,2]"));
    }

    #[test]
    fn missing_required_reports_described_field_type() {
        let issues = check(
            json!({}),
            json!({
                "type": "object",
                "required": ["units"],
                "properties": {"units": {"type": "array", "items": {"$ref": "#/components/schemas/Unit"}}}
            }),
        );
        let missing: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::MissingRequired)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].path, ".units");
        assert_eq!(missing[0].expected.as_deref(), Some("array<Unit>"));
        assert_eq!(missing[0].actual, "missing");
    }

    #[test]
    fn missing_required_without_declared_property_describes_unknown() {
        let issues = check(
            json!({}),
            json!({"type": "object", "required": ["ghost"], "properties": {}}),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingRequired);
        assert_eq!(issues[0].expected.as_deref(), Some("unknown"));
    }

    #[test]
    fn check_missing_false_suppresses_missing_field_issues() {
        let issues = {
            let mut log = IssueLog::new();
            let index = empty_index();
            Comparator::new(&index).compare(
                &json!({}),
                &node(json!({
                    "type": "object",
                    "required": ["id"],
                    "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
                })),
                "",
                "Test",
                false,
                &mut log,
            );
            log.into_inner()
        };
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn nullable_optional_absent_field_is_not_reported() {
        let issues = check(
            json!({"id": 1}),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer"},
                    "note": {"type": "string", "nullable": true}
                }
            }),
        );
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn array_validation_stops_at_the_ten_element_cap() {
        // Element 12 is a string, but only indexes 0..10 are visited, so
        // the single planted mismatch at index 7 is the only issue.
        let mut values: Vec<Value> = (0..15).map(|n| json!(n)).collect();
        values[7] = json!("seven");
        values[12] = json!("twelve");
        let issues = check(
            json!(values),
            json!({"type": "array", "items": {"type": "integer"}}),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TypeMismatch);
        assert_eq!(issues[0].path, "[7]");
        assert!(issues.iter().all(|i| !i.path.contains("[12]")));
    }

    #[test]
    fn boolean_never_satisfies_integer() {
        let issues = check(json!(true), json!({"type": "integer"}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TypeMismatch);
        assert_eq!(issues[0].expected.as_deref(), Some("integer"));
        assert_eq!(issues[0].actual, "boolean");
    }

    #[test]
    fn boolean_never_satisfies_number() {
        let issues = check(json!(false), json!({"type": "number"}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].actual, "boolean");
    }

    #[test]
    fn integer_never_satisfies_boolean() {
        let issues = check(json!(1), json!({"type": "boolean"}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TypeMismatch);
        assert_eq!(issues[0].expected.as_deref(), Some("boolean"));
        assert_eq!(issues[0].actual, "integer");
    }

    #[test]
    fn integer_satisfies_number_and_float_does_not_satisfy_integer() {
        assert!(check(json!(3), json!({"type": "number"})).is_empty());
        let issues = check(json!(3.5), json!({"type": "integer"}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].actual, "number");
    }

    #[test]
    fn null_against_nullable_is_silent() {
        let issues = check(json!(null), json!({"type": "string", "nullable": true}));
        assert!(issues.is_empty());
    }

    #[test]
    fn null_against_non_nullable_reports_once_and_stops() {
        // The object's fields are never visited: no missing_required for id.
        let issues = check(
            json!(null),
            json!({
                "type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "integer"}}
            }),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnexpectedNull);
        assert_eq!(issues[0].path, "(root)");
        assert_eq!(issues[0].expected.as_deref(), Some("object"));
        assert_eq!(issues[0].actual, "null");
    }

    #[test]
    fn null_against_untyped_node_reports_without_expectation() {
        let issues = check(json!(null), json!({}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnexpectedNull);
        assert_eq!(issues[0].expected, None);
    }

    #[test]
    fn ref_issues_attribute_to_the_referenced_schema() {
        let index = SchemaIndex::from_yaml_str(
            r#"
components:
  schemas:
    Player:
      type: object
      required: [id]
      properties:
        id:
          type: integer
        name:
          type: string
"#,
        )
        .unwrap();

        let value = json!({"id": "7", "extra": true});
        let via_ref = check_with(
            &index,
            value.clone(),
            json!({"$ref": "#/components/schemas/Player"}),
        );

        let direct = {
            let mut log = IssueLog::new();
            let player = index.get("Player").unwrap();
            Comparator::new(&index).compare(&value, player, "", "Player", true, &mut log);
            log.into_inner()
        };

        assert_eq!(via_ref, direct);
        assert!(via_ref.iter().all(|i| i.schema == "Player"));
    }

    #[test]
    fn unresolvable_ref_is_silently_skipped() {
        let issues = check(
            json!({"anything": 1}),
            json!({"$ref": "#/components/schemas/Elsewhere"}),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn map_entries_validate_against_the_entry_schema_under_the_container() {
        let issues = check(
            json!({"ATTACK": 4, "DEFENSE": "high"}),
            json!({"type": "object", "additionalProperties": {"type": "integer"}}),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, ".DEFENSE");
        assert_eq!(issues[0].schema, "Test");
        assert_eq!(issues[0].kind, IssueKind::TypeMismatch);
    }

    #[test]
    fn additional_properties_true_accepts_arbitrary_entries() {
        let issues = check(
            json!({"free": "form", "n": 1}),
            json!({"type": "object", "additionalProperties": true}),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn additional_properties_false_keeps_closed_object_checks() {
        let issues = check(
            json!({"declared": 1, "stray": 2}),
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {"declared": {"type": "integer"}}
            }),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::ExtraField);
        assert_eq!(issues[0].path, ".stray");
    }

    #[test]
    fn non_object_against_object_schema_stops_after_one_mismatch() {
        let issues = check(
            json!([1, 2, 3]),
            json!({
                "type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "integer"}}
            }),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TypeMismatch);
        assert_eq!(issues[0].path, "(root)");
        assert_eq!(issues[0].expected.as_deref(), Some("object"));
        assert_eq!(issues[0].actual, "array<integer>");
    }

    #[test]
    fn non_array_against_array_schema_reports_at_root() {
        let issues = check(
            json!({"not": "a list"}),
            json!({"type": "array", "items": {"type": "integer"}}),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].expected.as_deref(), Some("array"));
        assert_eq!(issues[0].actual, "object");
    }

    #[test]
    fn enum_member_passes_and_outsider_is_reported_quoted() {
        assert!(check(
            json!("ALIVE"),
            json!({"type": "string", "enum": ["ALIVE", "DEAD"]})
        )
        .is_empty());

        let issues = check(
            json!("UNKNOWN"),
            json!({"type": "string", "enum": ["ALIVE", "DEAD"]}),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::EnumMismatch);
        assert_eq!(issues[0].expected.as_deref(), Some("one of 2 enum values"));
        assert_eq!(issues[0].actual, "\"UNKNOWN\"");
        assert_eq!(issues[0].value.as_deref(), Some("UNKNOWN"));
    }

    #[test]
    fn nested_paths_compose_dots_and_indexes() {
        let issues = check(
            json!({"units": [{"name": 5}]}),
            json!({
                "type": "object",
                "properties": {
                    "units": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {"name": {"type": "string"}}
                        }
                    }
                }
            }),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, ".units[0].name");
    }

    #[test]
    fn undeclared_type_accepts_anything() {
        assert!(check(json!({"free": 1}), json!({})).is_empty());
        assert!(check(json!(42), json!({"type": "date-time"})).is_empty());
    }

    #[test]
    fn array_without_items_accepts_elements_but_not_nulls() {
        assert!(check(json!([1, "two", {}]), json!({"type": "array"})).is_empty());

        let issues = check(json!([1, null]), json!({"type": "array"}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnexpectedNull);
        assert_eq!(issues[0].path, "[1]");
    }

    #[test]
    fn long_values_are_truncated_in_issue_records() {
        let long = "y".repeat(120);
        let issues = check(json!(long), json!({"type": "integer"}));
        let value = issues[0].value.as_deref().unwrap();
        assert!(value.ends_with("..."));
        assert_eq!(value.len(), 53);
    }

    #[test]
    fn player_scenario_yields_exactly_three_issues() {
        // Player = {required: [id], properties: {id: integer, name: string}};
        // response {"id": "7", "extra": true} drifts three ways.
        let issues = check(
            json!({"id": "7", "extra": true}),
            json!({
                "type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
            }),
        );
        assert_eq!(issues.len(), 3, "got: {issues:?}");

        let type_issue = issues
            .iter()
            .find(|i| i.kind == IssueKind::TypeMismatch)
            .unwrap();
        assert_eq!(type_issue.path, ".id");
        assert_eq!(type_issue.expected.as_deref(), Some("integer"));
        assert_eq!(type_issue.actual, "string");

        let extra = issues
            .iter()
            .find(|i| i.kind == IssueKind::ExtraField)
            .unwrap();
        assert_eq!(extra.path, ".extra");
        assert_eq!(extra.actual, "boolean");

        let optional = issues
            .iter()
            .find(|i| i.kind == IssueKind::MissingOptional)
            .unwrap();
        assert_eq!(optional.path, ".name");
        assert_eq!(optional.expected.as_deref(), Some("string"));
    }
}
