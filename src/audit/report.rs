//! Verification report assembly and export.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::audit::entry::AuditLogEntry;
use crate::audit::hash::Digester;
use crate::audit::merkle::merkle_root_of_entries;
use crate::audit::verify::{ChainVerification, ChainVerifier, GenesisPolicy, Issue};
use crate::error::VerifierError;

/// Process exit code when the log verified.
pub const EXIT_VERIFIED: i32 = 0;
/// Process exit code when verification ran and found problems.
pub const EXIT_FAILED: i32 = 1;
/// Process exit code when verification could not run at all.
pub const EXIT_COULD_NOT_RUN: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Verified,
    Failed,
}

/// Result of one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub valid: bool,
    pub entries_checked: usize,
    pub merkle_root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchored_at: Option<String>,
    pub issues: Vec<Issue>,
}

/// Copyable form of a report, e.g. for a forensic artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportExport {
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Present only when the caller supplied an expected root to compare with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_root_matches: Option<bool>,
    #[serde(flatten)]
    pub report: VerificationReport,
}

impl VerificationReport {
    pub fn status(&self) -> ReportStatus {
        if self.valid {
            ReportStatus::Verified
        } else {
            ReportStatus::Failed
        }
    }

    /// Export form. `generated_at` is the only time value included and is
    /// left out entirely when `None`.
    pub fn export(&self, generated_at: Option<DateTime<Utc>>) -> ReportExport {
        self.export_against(generated_at, None)
    }

    /// Export form checked against an expected Merkle root. A mismatch makes
    /// the exported status `FAILED` even when the chain itself is valid.
    pub fn export_against(
        &self,
        generated_at: Option<DateTime<Utc>>,
        expected_root: Option<&str>,
    ) -> ReportExport {
        let merkle_root_matches = expected_root.map(|expected| self.merkle_root_matches(expected));
        let status = if self.valid && merkle_root_matches != Some(false) {
            ReportStatus::Verified
        } else {
            ReportStatus::Failed
        };

        ReportExport {
            status,
            timestamp: generated_at.map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            merkle_root_matches,
            report: self.clone(),
        }
    }

    /// Compare this report's root with an expected one, ignoring hex case.
    pub fn merkle_root_matches(&self, expected: &str) -> bool {
        self.merkle_root.eq_ignore_ascii_case(expected.trim())
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        if self.valid {
            format!(
                "✅ Audit log verified ({} entries, root: {})",
                self.entries_checked,
                display_root(&self.merkle_root)
            )
        } else {
            format!(
                "❌ Audit log failed verification ({} entries, {} issues, root: {})",
                self.entries_checked,
                self.issues.len(),
                display_root(&self.merkle_root)
            )
        }
    }
}

fn display_root(root: &str) -> &str {
    if root.is_empty() {
        "none"
    } else {
        root
    }
}

impl ReportExport {
    pub fn to_json_pretty(&self) -> Result<String, VerifierError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn exit_code(&self) -> i32 {
        match self.status {
            ReportStatus::Verified => EXIT_VERIFIED,
            ReportStatus::Failed => EXIT_FAILED,
        }
    }
}

/// Runs the chain verifier and Merkle aggregation and joins their output.
#[derive(Clone, Default)]
pub struct VerificationReportBuilder {
    verifier: ChainVerifier,
    anchored_at: Option<String>,
}

impl VerificationReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchored_at(mut self, anchored_at: Option<String>) -> Self {
        self.anchored_at = anchored_at;
        self
    }

    pub fn genesis_policy(mut self, policy: GenesisPolicy) -> Self {
        self.verifier = self.verifier.genesis_policy(policy);
        self
    }

    pub fn digester(mut self, digester: Arc<dyn Digester>) -> Self {
        let policy = self.verifier.policy();
        self.verifier = ChainVerifier::with_digester(digester).genesis_policy(policy);
        self
    }

    pub fn build(&self, entries: &[AuditLogEntry]) -> VerificationReport {
        let chain = self.verifier.verify(entries);
        self.assemble(entries, chain)
    }

    pub async fn build_async(&self, entries: &[AuditLogEntry]) -> VerificationReport {
        let chain = self.verifier.verify_async(entries).await;
        self.assemble(entries, chain)
    }

    /// Join a finished chain scan with the Merkle root of the same entries.
    pub fn assemble(
        &self,
        entries: &[AuditLogEntry],
        chain: ChainVerification,
    ) -> VerificationReport {
        VerificationReport {
            valid: chain.valid,
            entries_checked: chain.entries_checked,
            merkle_root: merkle_root_of_entries(entries),
            anchored_at: self.anchored_at.clone(),
            issues: chain.issues,
        }
    }
}
