//! Audit Log Entry
//!
//! Defines the record of one administrative action and the canonical
//! payload its integrity hash is computed over.

use serde::{Deserialize, Serialize};

use crate::audit::hash::{DigestError, Digester, Sha256Digester};

/// Who performed the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// The object an action was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub target_type: String,
    pub id: String,
}

/// One immutable audit record as handed over by the log store.
///
/// `timestamp` is kept as the exact string that was hashed; re-parsing it
/// would change the canonical payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: String,
    pub actor: Actor,
    pub action: String,
    pub target: Target,
    #[serde(alias = "meta_hash")]
    pub meta_hash: String,
    #[serde(
        default,
        alias = "prev_hash",
        alias = "prev_tamper_hash",
        alias = "previous_hash",
        skip_serializing_if = "Option::is_none"
    )]
    pub prev_hash: Option<String>,
    #[serde(alias = "tamper_hash")]
    pub hash: String,
}

impl AuditLogEntry {
    /// Previous hash as it enters the canonical payload.
    pub fn prev_hash_or_empty(&self) -> &str {
        self.prev_hash.as_deref().unwrap_or("")
    }

    /// Verify this entry's stored hash against its fields
    pub fn verify_hash(&self) -> bool {
        matches!(EntryHasher::expected_hash(self), Ok(h) if h == self.hash)
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} {}: {} -> {}:{}",
            self.timestamp, self.id, self.action, self.target.target_type, self.target.id
        )
    }
}

/// Builds the canonical payload of an entry and hashes it.
pub struct EntryHasher;

impl EntryHasher {
    /// `prevHash|timestamp|actor.id|action|target.id|metaHash`, missing prevHash as "".
    pub fn canonical_payload(entry: &AuditLogEntry) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            entry.prev_hash_or_empty(),
            entry.timestamp,
            entry.actor.id,
            entry.action,
            entry.target.id,
            entry.meta_hash
        )
    }

    pub fn expected_hash(entry: &AuditLogEntry) -> Result<String, DigestError> {
        Self::expected_hash_with(entry, &Sha256Digester)
    }

    pub fn expected_hash_with(
        entry: &AuditLogEntry,
        digester: &dyn Digester,
    ) -> Result<String, DigestError> {
        let payload = Self::canonical_payload(entry);
        digester.digest(payload.as_bytes())
    }
}
