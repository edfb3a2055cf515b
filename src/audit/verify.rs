//! Audit Log Verification
//!
//! Recomputes every entry hash and checks the links between consecutive
//! entries in a single ordered pass. Every problem found is recorded as an
//! [`Issue`]; the scan never stops early and never fails.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::audit::entry::{AuditLogEntry, EntryHasher};
use crate::audit::hash::{DigestError, Digester, Sha256Digester};
use crate::error::VerifierError;

/// How the first entry's `prevHash` is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenesisPolicy {
    /// The first entry's `prevHash` is not checked.
    #[default]
    Lenient,
    /// A non-empty `prevHash` on the first entry is reported as a chain break.
    Strict,
}

impl FromStr for GenesisPolicy {
    type Err = VerifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(VerifierError::ConfigError(format!(
                "Unknown genesis policy {:?}, expected lenient or strict",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    HashMismatch,
    ChainBreak,
    HashComputationFailed,
}

/// A located integrity problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub index: usize,
    pub reason: IssueKind,
    pub entry_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Issue {
    fn hash_mismatch(index: usize, entry: &AuditLogEntry, computed: String) -> Self {
        Self {
            index,
            reason: IssueKind::HashMismatch,
            entry_id: entry.id.clone(),
            expected: Some(entry.hash.clone()),
            actual: Some(computed),
            detail: None,
        }
    }

    fn computation_failed(index: usize, entry: &AuditLogEntry, err: &DigestError) -> Self {
        Self {
            index,
            reason: IssueKind::HashComputationFailed,
            entry_id: entry.id.clone(),
            expected: Some(entry.hash.clone()),
            actual: None,
            detail: Some(err.to_string()),
        }
    }

    fn chain_break(index: usize, entry: &AuditLogEntry, expected_prev: &str) -> Self {
        Self {
            index,
            reason: IssueKind::ChainBreak,
            entry_id: entry.id.clone(),
            expected: Some(expected_prev.to_string()),
            actual: Some(
                entry
                    .prev_hash
                    .clone()
                    .unwrap_or_else(|| "null".to_string()),
            ),
            detail: None,
        }
    }
}

/// Outcome of one chain scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainVerification {
    pub valid: bool,
    pub entries_checked: usize,
    pub issues: Vec<Issue>,
}

impl ChainVerification {
    /// Indices whose content no longer matches their stored hash
    pub fn tampered_indices(&self) -> Vec<usize> {
        self.indices_of(IssueKind::HashMismatch)
    }

    /// Indices where the link to the predecessor is broken
    pub fn chain_break_indices(&self) -> Vec<usize> {
        self.indices_of(IssueKind::ChainBreak)
    }

    fn indices_of(&self, kind: IssueKind) -> Vec<usize> {
        self.issues
            .iter()
            .filter(|issue| issue.reason == kind)
            .map(|issue| issue.index)
            .collect()
    }
}

/// Stateless hash chain verifier. Create one per run or share it freely.
#[derive(Clone)]
pub struct ChainVerifier {
    digester: Arc<dyn Digester>,
    genesis_policy: GenesisPolicy,
    chunk_size: Option<usize>,
}

/// Entries per hashing task: the log split evenly across available cores.
fn default_chunk_size(len: usize) -> usize {
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    len.div_ceil(workers).max(1)
}

impl Default for ChainVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainVerifier {
    pub fn new() -> Self {
        Self::with_digester(Arc::new(Sha256Digester))
    }

    pub fn with_digester(digester: Arc<dyn Digester>) -> Self {
        Self {
            digester,
            genesis_policy: GenesisPolicy::default(),
            chunk_size: None,
        }
    }

    pub fn genesis_policy(mut self, policy: GenesisPolicy) -> Self {
        self.genesis_policy = policy;
        self
    }

    /// Fix the number of entries hashed per task in [`ChainVerifier::verify_async`].
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size.max(1));
        self
    }

    pub fn policy(&self) -> GenesisPolicy {
        self.genesis_policy
    }

    /// Verify the entries in the order given.
    pub fn verify(&self, entries: &[AuditLogEntry]) -> ChainVerification {
        info!("Verifying audit chain of {} entries", entries.len());

        let computed = entries
            .iter()
            .map(|entry| EntryHasher::expected_hash_with(entry, self.digester.as_ref()))
            .collect();

        self.check(entries, computed)
    }

    /// Verify with entry hashing spread over blocking tasks, one per chunk.
    ///
    /// Digests are collected back into index order before any link is
    /// checked, so the result is identical to [`ChainVerifier::verify`].
    pub async fn verify_async(&self, entries: &[AuditLogEntry]) -> ChainVerification {
        let chunk_size = self.chunk_size.unwrap_or_else(|| default_chunk_size(entries.len()));
        info!(
            "Verifying audit chain of {} entries with parallel hashing ({} per task)",
            entries.len(),
            chunk_size
        );

        let mut tasks = JoinSet::new();
        for (chunk_index, chunk) in entries.chunks(chunk_size).enumerate() {
            let start = chunk_index * chunk_size;
            let payloads: Vec<String> = chunk.iter().map(EntryHasher::canonical_payload).collect();
            let digester = Arc::clone(&self.digester);
            tasks.spawn_blocking(move || {
                let digests: Vec<Result<String, DigestError>> = payloads
                    .iter()
                    .map(|payload| digester.digest(payload.as_bytes()))
                    .collect();
                (start, digests)
            });
        }

        let mut slots: Vec<Option<Result<String, DigestError>>> = vec![None; entries.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((start, digests)) => {
                    for (offset, result) in digests.into_iter().enumerate() {
                        slots[start + offset] = Some(result);
                    }
                }
                Err(e) => warn!("Hash task did not complete: {}", e),
            }
        }

        let computed = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(DigestError("hash task did not complete".to_string())))
            })
            .collect();

        self.check(entries, computed)
    }

    fn check(
        &self,
        entries: &[AuditLogEntry],
        computed: Vec<Result<String, DigestError>>,
    ) -> ChainVerification {
        let mut issues = Vec::new();

        for (index, (entry, result)) in entries.iter().zip(computed).enumerate() {
            match result {
                Ok(actual) if actual == entry.hash => {
                    debug!("Entry {} ({}) hash ok", index, entry.id);
                }
                Ok(actual) => issues.push(Issue::hash_mismatch(index, entry, actual)),
                Err(e) => issues.push(Issue::computation_failed(index, entry, &e)),
            }

            if index == 0 {
                if self.genesis_policy == GenesisPolicy::Strict
                    && !entry.prev_hash_or_empty().is_empty()
                {
                    issues.push(Issue::chain_break(index, entry, ""));
                }
                continue;
            }

            let prev = &entries[index - 1];
            if entry.prev_hash_or_empty() != prev.hash {
                issues.push(Issue::chain_break(index, entry, &prev.hash));
            }
        }

        for issue in &issues {
            warn!(
                "Audit entry {} ({}): {:?}",
                issue.index, issue.entry_id, issue.reason
            );
        }

        let valid = issues.is_empty();
        info!(
            "Audit chain verification finished: {} entries, {} issues",
            entries.len(),
            issues.len()
        );

        ChainVerification {
            valid,
            entries_checked: entries.len(),
            issues,
        }
    }
}

/// Verify a chain with SHA-256 and the lenient genesis policy
pub fn verify_chain(entries: &[AuditLogEntry]) -> ChainVerification {
    ChainVerifier::new().verify(entries)
}

/// Async counterpart of [`verify_chain`]
pub async fn verify_chain_async(entries: &[AuditLogEntry]) -> ChainVerification {
    ChainVerifier::new().verify_async(entries).await
}
