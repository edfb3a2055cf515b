pub mod audit;
pub mod config;
pub mod error;

pub use audit::{
    verify_chain, AuditLogEntry, ChainVerifier, Issue, IssueKind, VerificationReport,
    VerificationReportBuilder,
};
pub use error::VerifierError;
