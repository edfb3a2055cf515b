//! Audit log loading at the store boundary.
//!
//! Accepts a JSON array of entries or a stream of entry objects (JSON Lines
//! or concatenated pretty-printed objects). A leading byte order mark is ignored.
//! Alternate persisted field names (`tamper_hash`, `prev_tamper_hash`,
//! `prev_hash`, ...) are mapped onto [`AuditLogEntry`] here through serde
//! aliases, so the verifier only ever sees one naming scheme.

use serde_json::{Deserializer, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::audit::entry::AuditLogEntry;
use crate::error::VerifierError;

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn entry_from_value(value: Value, position: &str) -> Result<AuditLogEntry, VerifierError> {
    match &value {
        Value::Object(fields) if fields.contains_key("id") => {}
        Value::Object(_) => {
            return Err(VerifierError::not_a_sequence(&format!(
                "an object that is not an audit entry at {}",
                position
            )))
        }
        other => {
            return Err(VerifierError::not_a_sequence(&format!(
                "{} at {}",
                kind_of(other),
                position
            )))
        }
    }

    serde_json::from_value(value).map_err(|e| {
        VerifierError::LoadError(format!("Failed to parse entry at {}: {}", position, e))
    })
}

/// Line on which the next value after `offset` starts.
fn line_at(input: &str, offset: usize) -> usize {
    let rest = &input[offset..];
    let start = offset + (rest.len() - rest.trim_start().len());
    input[..start].matches('\n').count() + 1
}

/// Parse an ordered entry list, keeping the order it appears in.
///
/// The input is read as a stream of JSON values, so entries may span several
/// lines. A single top-level array holds the whole log; otherwise every
/// top-level value must be one entry object.
pub fn parse_entries(input: &str) -> Result<Vec<AuditLogEntry>, VerifierError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut stream = Deserializer::from_str(input).into_iter::<Value>();
    let mut values = Vec::new();
    loop {
        let line = line_at(input, stream.byte_offset());
        match stream.next() {
            Some(Ok(value)) => values.push((line, value)),
            Some(Err(e)) => {
                return Err(VerifierError::LoadError(format!(
                    "Failed to parse audit log: {}",
                    e
                )))
            }
            None => break,
        }
    }

    if let [(_, Value::Array(items))] = values.as_mut_slice() {
        return std::mem::take(items)
            .into_iter()
            .enumerate()
            .map(|(index, item)| entry_from_value(item, &format!("index {}", index)))
            .collect();
    }

    values
        .into_iter()
        .map(|(line, value)| entry_from_value(value, &format!("line {}", line)))
        .collect()
}

/// Load audit log entries from a JSON or JSON Lines file
pub fn load_entries_from_file(path: impl AsRef<Path>) -> Result<Vec<AuditLogEntry>, VerifierError> {
    let path = path.as_ref();
    info!("Loading audit log: {}", path.display());

    if !path.exists() {
        return Err(VerifierError::LoadError(format!(
            "Audit log file does not exist: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VerifierError::LoadError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let entries = parse_entries(&contents)?;
    debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LEGACY_LINE: &str = r#"{"id":"a1","timestamp":"2025-01-01T00:00:00Z","actor":{"id":"u1","email":"u1@example.com"},"action":"create","target":{"type":"user","id":"t1"},"meta_hash":"m1","prev_tamper_hash":null,"tamper_hash":"abc"}"#;

    #[test]
    fn test_alternate_field_names() {
        let entries = parse_entries(LEGACY_LINE).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hash, "abc");
        assert_eq!(entries[0].meta_hash, "m1");
        assert_eq!(entries[0].prev_hash, None);
        assert_eq!(entries[0].target.target_type, "user");
    }

    #[test]
    fn test_json_array_keeps_order() {
        let input = r#"[
            {"id":"b","timestamp":"t2","actor":{"id":"u","email":""},"action":"x","target":{"type":"y","id":"z"},"metaHash":"m","prevHash":"h1","hash":"h2"},
            {"id":"a","timestamp":"t1","actor":{"id":"u","email":""},"action":"x","target":{"type":"y","id":"z"},"metaHash":"m","prev_hash":"h0","hash":"h1"}
        ]"#;
        let entries = parse_entries(input).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(entries[1].prev_hash.as_deref(), Some("h0"));
    }

    #[test]
    fn test_non_sequence_input_is_contract_violation() {
        let err = parse_entries("42").unwrap_err();
        assert!(err.is_contract_violation());

        let err = parse_entries("[1, 2]").unwrap_err();
        assert!(err.is_contract_violation());

        let err = parse_entries("\"entries\"").unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_wrapped_object_is_contract_violation() {
        let err = parse_entries("{\n  \"entries\": []\n}\n").unwrap_err();
        assert!(err.is_contract_violation(), "{:?}", err);

        let err = parse_entries(r#"{"entries": []}"#).unwrap_err();
        assert!(err.is_contract_violation(), "{:?}", err);

        let err = parse_entries(&format!("{}\n[]", LEGACY_LINE)).unwrap_err();
        assert!(err.is_contract_violation(), "{:?}", err);
    }

    #[test]
    fn test_pretty_printed_entries_stream() {
        let first: Value = serde_json::from_str(LEGACY_LINE).unwrap();
        let mut second = first.clone();
        second["id"] = Value::from("a2");
        let input = format!(
            "{}\n{}\n",
            serde_json::to_string_pretty(&first).unwrap(),
            serde_json::to_string_pretty(&second).unwrap()
        );

        let entries = parse_entries(&input).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[test]
    fn test_error_reports_line_of_bad_value() {
        let input = format!("{}\n{}\n7\n", LEGACY_LINE, LEGACY_LINE);
        let err = parse_entries(&input).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(err.to_string().contains("line 3"), "{}", err);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        assert!(parse_entries("\u{feff}[]").unwrap().is_empty());
        assert!(parse_entries("\u{feff}").unwrap().is_empty());

        let entries = parse_entries(&format!("\u{feff}[{}]", LEGACY_LINE)).unwrap();
        assert_eq!(entries.len(), 1);
        let entries = parse_entries(&format!("\u{feff}{}", LEGACY_LINE)).unwrap();
        assert_eq!(entries[0].hash, "abc");
    }

    #[test]
    fn test_malformed_entry_is_load_error() {
        let err = parse_entries(r#"{"id":"a1"}"#).unwrap_err();
        assert!(matches!(err, VerifierError::LoadError(_)));
    }

    #[test]
    fn test_blank_input_is_empty_log() {
        assert!(parse_entries("").unwrap().is_empty());
        assert!(parse_entries("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", LEGACY_LINE).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", LEGACY_LINE.replace("\"a1\"", "\"a2\"")).unwrap();

        let entries = load_entries_from_file(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, "a2");

        assert!(load_entries_from_file("/nonexistent/audit.jsonl").is_err());
    }
}
