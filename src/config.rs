use serde::{Deserialize, Serialize};
use std::env;

use crate::audit::GenesisPolicy;
use crate::error::VerifierError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub log_path: Option<String>,
    pub genesis_policy: GenesisPolicy,
    pub anchored_at: Option<String>,
    pub expected_merkle_root: Option<String>,
    pub parallel_hashing: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            genesis_policy: GenesisPolicy::Lenient,
            anchored_at: None,
            expected_merkle_root: None,
            parallel_hashing: false,
        }
    }
}

impl VerifierConfig {
    pub fn load() -> Result<Self, VerifierError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; `load` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VerifierError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_path = non_empty("AUDIT_LOG_PATH");

        let genesis_policy = match non_empty("AUDIT_GENESIS_POLICY") {
            Some(raw) => raw.parse()?,
            None => GenesisPolicy::Lenient,
        };

        let anchored_at = non_empty("AUDIT_ANCHORED_AT");

        let expected_merkle_root = non_empty("AUDIT_EXPECTED_MERKLE_ROOT");

        let parallel_hashing = match non_empty("AUDIT_PARALLEL_HASHING") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                VerifierError::ConfigError(format!(
                    "AUDIT_PARALLEL_HASHING must be true or false, got {:?}",
                    raw
                ))
            })?,
            None => false,
        };

        Ok(VerifierConfig {
            log_path,
            genesis_policy,
            anchored_at,
            expected_merkle_root,
            parallel_hashing,
        })
    }
}
