//! Audit Log Verification
//!
//! Tamper-evident checking of administrative audit logs: hash chain
//! recomputation, link checks and Merkle root derivation over an ordered
//! snapshot of entries.

pub mod entry;
pub mod hash;
pub mod loader;
pub mod merkle;
pub mod report;
pub mod run;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use entry::{Actor, AuditLogEntry, EntryHasher, Target};
pub use hash::{sha256_hex, DigestError, Digester, Sha256Digester};
pub use loader::{load_entries_from_file, parse_entries};
pub use merkle::{
    generate_merkle_proof, merkle_root, merkle_root_of_entries, verify_merkle_proof,
    verify_merkle_root, MerkleProof,
};
pub use report::{
    ReportExport, ReportStatus, VerificationReport, VerificationReportBuilder, EXIT_COULD_NOT_RUN,
    EXIT_FAILED, EXIT_VERIFIED,
};
pub use run::{exit_code, verify_log_file, RunOptions};
pub use verify::{
    verify_chain, verify_chain_async, ChainVerification, ChainVerifier, GenesisPolicy, Issue,
    IssueKind,
};
