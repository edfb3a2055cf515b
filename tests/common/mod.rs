use audit_verifier::audit::{Actor, AuditLogEntry, EntryHasher, Target};

/// Build an entry and seal it with the hash of its own fields.
pub fn sealed_entry(
    id: &str,
    timestamp: &str,
    actor_id: &str,
    action: &str,
    target_id: &str,
    meta_hash: &str,
    prev_hash: Option<&str>,
) -> AuditLogEntry {
    let mut entry = AuditLogEntry {
        id: id.to_string(),
        timestamp: timestamp.to_string(),
        actor: Actor {
            id: actor_id.to_string(),
            email: format!("{}@family.example", actor_id),
            ip: Some("10.0.0.1".to_string()),
            role: Some("admin".to_string()),
        },
        action: action.to_string(),
        target: Target {
            target_type: "document".to_string(),
            id: target_id.to_string(),
        },
        meta_hash: meta_hash.to_string(),
        prev_hash: prev_hash.map(str::to_string),
        hash: String::new(),
    };
    entry.hash = EntryHasher::expected_hash(&entry).expect("sha256 never fails");
    entry
}

/// A valid chain of `count` entries with varied actions.
pub fn create_test_chain(count: usize) -> Vec<AuditLogEntry> {
    const ACTIONS: [&str; 4] = ["create", "update", "delete", "login"];
    let mut entries: Vec<AuditLogEntry> = Vec::with_capacity(count);

    for i in 0..count {
        let prev = entries.last().map(|e| e.hash.clone());
        entries.push(sealed_entry(
            &format!("log-{}", i),
            &format!("2025-06-01T12:{:02}:{:02}.000Z", (i / 60) % 60, i % 60),
            &format!("admin-{}", i % 2),
            ACTIONS[i % ACTIONS.len()],
            &format!("doc-{}", i),
            &format!("meta-{:04}", i),
            prev.as_deref(),
        ));
    }

    entries
}

/// The three-entry create/update/delete chain used in the end-to-end scenario.
pub fn create_scenario_chain() -> Vec<AuditLogEntry> {
    let e0 = sealed_entry("id0", "2025-01-01T00:00:00Z", "u1", "create", "t1", "m1", None);
    let e1 = sealed_entry(
        "id1",
        "2025-01-01T00:01:00Z",
        "u1",
        "update",
        "t1",
        "m1",
        Some(&e0.hash),
    );
    let e2 = sealed_entry(
        "id2",
        "2025-01-01T00:02:00Z",
        "u1",
        "delete",
        "t1",
        "m1",
        Some(&e1.hash),
    );
    vec![e0, e1, e2]
}
