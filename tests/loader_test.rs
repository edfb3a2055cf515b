//! Loading persisted logs at the store boundary and verifying them.

use audit_verifier::audit::{load_entries_from_file, IssueKind, VerificationReportBuilder};
use audit_verifier::VerifierError;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

mod common;
use common::*;

/// Rewrite an entry with the legacy `tamper_hash` / `prev_tamper_hash` names.
fn legacy_json(entry: &audit_verifier::AuditLogEntry) -> serde_json::Value {
    let mut value = serde_json::to_value(entry).unwrap();
    let object = value.as_object_mut().unwrap();
    let hash = object.remove("hash").unwrap();
    object.insert("tamper_hash".to_string(), hash);
    let prev = object.remove("prevHash").unwrap_or(serde_json::Value::Null);
    object.insert("prev_tamper_hash".to_string(), prev);
    value
}

#[test]
fn test_legacy_jsonl_verifies() {
    let entries = create_test_chain(6);
    let mut file = NamedTempFile::new().unwrap();
    for entry in &entries {
        writeln!(file, "{}", legacy_json(entry)).unwrap();
    }

    let loaded = load_entries_from_file(file.path()).unwrap();
    assert_eq!(loaded, entries);

    let report = VerificationReportBuilder::new().build(&loaded);
    assert!(report.valid);
    assert_eq!(report.entries_checked, 6);
}

#[test]
fn test_json_array_with_tamper() {
    let mut entries = create_test_chain(4);
    entries[2].actor.id = "someone-else".to_string();

    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.json");
    std::fs::write(&path, serde_json::to_string_pretty(&entries).unwrap()).unwrap();

    let loaded = load_entries_from_file(&path).unwrap();
    let report = VerificationReportBuilder::new().build(&loaded);
    assert!(!report.valid);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].index, 2);
    assert_eq!(report.issues[0].reason, IssueKind::HashMismatch);
}

#[test]
fn test_object_payload_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.json");
    std::fs::write(&path, "{\n  \"entries\": []\n}\n").unwrap();

    let err = load_entries_from_file(&path).unwrap_err();
    assert!(err.is_contract_violation(), "{:?}", err);
}

#[test]
fn test_pretty_printed_log_with_byte_order_mark() {
    let entries = create_test_chain(3);
    let mut text = String::from("\u{feff}");
    for entry in &entries {
        text.push_str(&serde_json::to_string_pretty(entry).unwrap());
        text.push('\n');
    }
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();

    let loaded = load_entries_from_file(file.path()).unwrap();
    assert_eq!(loaded, entries);
    assert!(VerificationReportBuilder::new().build(&loaded).valid);
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let result = load_entries_from_file(dir.path().join("missing.jsonl"));
    assert!(matches!(result, Err(VerifierError::LoadError(_))));
}
