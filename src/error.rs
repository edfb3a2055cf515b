use thiserror::Error;

impl From<serde_json::Error> for VerifierError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for VerifierError {
    fn from(err: std::io::Error) -> Self {
        Self::LoadError(format!("I/O error: {}", err))
    }
}

/// Errors that stop a verification run from happening at all.
///
/// Tamper findings are never reported through this type; they are issues
/// inside a `VerificationReport`.
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to load audit log: {0}")]
    LoadError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl VerifierError {
    pub fn not_a_sequence(found: &str) -> Self {
        Self::InvalidInput(format!(
            "Expected an ordered sequence of audit entries, found {}",
            found
        ))
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::InvalidInput(format!(
            "Leaf index {} out of range for {} leaves",
            index, len
        ))
    }

    /// True when the caller handed over something that is not an entry list.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
