//! One verification run over a persisted log, as driven by the CLI.
//!
//! Loading, verifying, checking the expected root and choosing the exit code
//! live here so the whole path is testable without spawning a process.

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{error, info, warn};

use crate::audit::loader::load_entries_from_file;
use crate::audit::report::{ReportExport, VerificationReportBuilder, EXIT_COULD_NOT_RUN};
use crate::error::VerifierError;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub expected_merkle_root: Option<String>,
    pub parallel: bool,
    pub generated_at: Option<DateTime<Utc>>,
}

/// Load the log at `path`, verify it and export the result.
///
/// `Err` means verification could not run; tamper findings and root
/// mismatches are reported inside the returned export.
pub async fn verify_log_file(
    path: impl AsRef<Path>,
    builder: &VerificationReportBuilder,
    options: &RunOptions,
) -> Result<ReportExport, VerifierError> {
    let entries = load_entries_from_file(path)?;

    let report = if options.parallel {
        builder.build_async(&entries).await
    } else {
        builder.build(&entries)
    };

    let export = report.export_against(options.generated_at, options.expected_merkle_root.as_deref());
    match (export.merkle_root_matches, options.expected_merkle_root.as_deref()) {
        (Some(true), _) => info!("Merkle root matches expected value"),
        (Some(false), Some(expected)) => warn!(
            "Merkle root mismatch. Expected: {}, Got: {}",
            expected, report.merkle_root
        ),
        _ => {}
    }

    info!("{}", report.summary());
    Ok(export)
}

/// Exit code for a finished or failed run: 0 verified, 1 failed, 2 could not run.
pub fn exit_code(outcome: &Result<ReportExport, VerifierError>) -> i32 {
    match outcome {
        Ok(export) => export.exit_code(),
        Err(e) => {
            error!("Audit log verification could not run: {}", e);
            EXIT_COULD_NOT_RUN
        }
    }
}
