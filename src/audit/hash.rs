//! Digest primitive shared by entry hashing and Merkle aggregation.
//!
//! Everything in this crate hashes with SHA-256 and encodes as lowercase hex,
//! so a hash produced in one place compares byte-for-byte with any other.

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("digest computation failed: {0}")]
pub struct DigestError(pub String);

/// SHA-256 of `input` as lowercase hex.
pub fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Hash function used to recompute entry hashes.
///
/// Implementations must be deterministic and side-effect free. Errors are
/// turned into `HashComputationFailed` issues by the verifier, never
/// propagated out of a run.
pub trait Digester: Send + Sync {
    fn digest(&self, input: &[u8]) -> Result<String, DigestError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn digest(&self, input: &[u8]) -> Result<String, DigestError> {
        Ok(sha256_hex(input))
    }
}
