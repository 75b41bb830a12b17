//! Record ingestion from JSON.
//!
//! Only structural corruption is fatal: a source that is not an array, or an
//! entry that is not an object. Individual fields are normalized leniently so
//! one malformed value never keeps a record out of the index.

use serde_json::{Map, Value};

use super::Record;
use crate::error::ConstructionError;

/// Accepted source keys per record field, canonical name first.
const IDENTIFIER_KEYS: &[&str] = &["identifier", "id", "cve"];
const DESCRIPTION_KEYS: &[&str] = &["description"];
const PACKAGE_KEYS: &[&str] = &["package", "image"];
const REPOSITORY_KEYS: &[&str] = &["repository", "repo"];
const SEVERITY_KEYS: &[&str] = &["severity"];
const STATUS_KEYS: &[&str] = &["status"];
const DISCOVERED_AT_KEYS: &[&str] = &["discovered_at", "discoveredAt"];
const FIXED_AT_KEYS: &[&str] = &["fixed_at", "fixedAt"];

/// Parses a JSON array of records.
pub fn records_from_json(source: &str) -> Result<Vec<Record>, ConstructionError> {
    let value: Value = serde_json::from_str(source)
        .map_err(|error| ConstructionError::InvalidSource(error.to_string()))?;
    match value {
        Value::Array(values) => records_from_values(values),
        other => Err(ConstructionError::InvalidSource(format!(
            "expected an array of records, found {}",
            value_kind(&other)
        ))),
    }
}

/// Normalizes already-decoded JSON values into records.
pub fn records_from_values(values: Vec<Value>) -> Result<Vec<Record>, ConstructionError> {
    values
        .into_iter()
        .enumerate()
        .map(|(position, value)| record_from_value(position, value))
        .collect()
}

/// Normalizes one JSON value into a record.
pub fn record_from_value(position: usize, value: Value) -> Result<Record, ConstructionError> {
    let Value::Object(object) = value else {
        return Err(ConstructionError::InvalidRecord {
            position,
            reason: format!("expected an object, found {}", value_kind(&value)),
        });
    };

    Ok(Record {
        identifier: field(&object, position, IDENTIFIER_KEYS),
        description: field(&object, position, DESCRIPTION_KEYS),
        package: field(&object, position, PACKAGE_KEYS),
        repository: field(&object, position, REPOSITORY_KEYS),
        severity: field(&object, position, SEVERITY_KEYS),
        status: field(&object, position, STATUS_KEYS),
        discovered_at: field(&object, position, DISCOVERED_AT_KEYS),
        fixed_at: field(&object, position, FIXED_AT_KEYS),
    })
}

fn field(object: &Map<String, Value>, position: usize, keys: &[&str]) -> String {
    let Some((key, value)) = keys
        .iter()
        .find_map(|key| object.get(*key).map(|value| (*key, value)))
    else {
        return String::new();
    };

    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => {
            log::debug!(
                "ignoring malformed field record={} field={} kind={}",
                position,
                key,
                value_kind(value)
            );
            String::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_records_with_aliases() {
        let records = records_from_json(
            r#"[
                {"id": "CVE-1", "image": "nginx:1.25", "repo": "web", "severity": "high",
                 "status": "open", "discoveredAt": "2024-01-02", "fixedAt": null},
                {"identifier": "CVE-2", "package": "openssl", "description": "heap overflow"}
            ]"#,
        )
        .expect("records");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "CVE-1");
        assert_eq!(records[0].package, "nginx:1.25");
        assert_eq!(records[0].repository, "web");
        assert_eq!(records[0].discovered_at, "2024-01-02");
        assert_eq!(records[0].fixed_at, "");
        assert_eq!(records[1].description, "heap overflow");
        assert_eq!(records[1].severity, "");
    }

    #[test]
    fn canonical_key_wins_over_alias() {
        let record = record_from_value(0, json!({"identifier": "CVE-A", "id": "CVE-B"}))
            .expect("record");
        assert_eq!(record.identifier, "CVE-A");
    }

    #[test]
    fn malformed_fields_do_not_reject_record() {
        let record = record_from_value(
            3,
            json!({"identifier": 42, "severity": ["high"], "status": {"state": "open"}, "package": true}),
        )
        .expect("record");
        assert_eq!(record.identifier, "42");
        assert_eq!(record.severity, "");
        assert_eq!(record.status, "");
        assert_eq!(record.package, "true");
    }

    #[test]
    fn non_object_record_is_fatal() {
        let error = records_from_values(vec![json!({"id": "CVE-1"}), json!("CVE-2")])
            .expect_err("string record should fail");
        assert_eq!(
            error,
            ConstructionError::InvalidRecord {
                position: 1,
                reason: "expected an object, found string".to_string(),
            }
        );
    }

    #[test]
    fn non_array_source_is_fatal() {
        let error = records_from_json(r#"{"records": []}"#).expect_err("object source");
        assert!(matches!(error, ConstructionError::InvalidSource(_)));

        let error = records_from_json("[{").expect_err("truncated source");
        assert!(matches!(error, ConstructionError::InvalidSource(_)));
    }
}
