//! Chain fixtures for unit tests.

use crate::audit::entry::{Actor, AuditLogEntry, EntryHasher, Target};

/// Build an entry whose stored hash matches its fields.
pub fn entry(
    id: &str,
    timestamp: &str,
    actor_id: &str,
    action: &str,
    target_id: &str,
    meta_hash: &str,
    prev_hash: Option<&str>,
) -> AuditLogEntry {
    let mut e = AuditLogEntry {
        id: id.to_string(),
        timestamp: timestamp.to_string(),
        actor: Actor {
            id: actor_id.to_string(),
            email: format!("{}@example.com", actor_id),
            ip: None,
            role: Some("admin".to_string()),
        },
        action: action.to_string(),
        target: Target {
            target_type: "record".to_string(),
            id: target_id.to_string(),
        },
        meta_hash: meta_hash.to_string(),
        prev_hash: prev_hash.map(str::to_string),
        hash: String::new(),
    };
    e.hash = EntryHasher::expected_hash(&e).unwrap();
    e
}

/// A valid chain of `count` entries.
pub fn chain(count: usize) -> Vec<AuditLogEntry> {
    let mut entries: Vec<AuditLogEntry> = Vec::with_capacity(count);
    for i in 0..count {
        let prev = entries.last().map(|e| e.hash.clone());
        entries.push(entry(
            &format!("entry-{}", i),
            &format!("2025-01-01T00:{:02}:00Z", i % 60),
            &format!("user-{}", i % 3),
            if i % 2 == 0 { "create" } else { "update" },
            &format!("target-{}", i),
            &format!("meta-{}", i),
            prev.as_deref(),
        ));
    }
    entries
}
