//! Error types for CropShield
//!
//! Two layers:
//! - [`ContractError`] is returned by every ledger-resident handler. It carries
//!   a stable numeric code so receipts stay comparable across implementations.
//! - [`CropShieldError`] wraps host concerns around the core (configuration,
//!   snapshot storage, transaction decoding, sequencer shutdown).

use thiserror::Error;

/// Result type alias for host-level operations
pub type Result<T> = std::result::Result<T, CropShieldError>;

/// Result type alias for ledger handlers
pub type ContractResult<T> = std::result::Result<T, ContractError>;

/// Failure taxonomy of the ledger-resident state machines
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("Caller is not authorized for this operation")]
    Unauthorized,

    #[error("Insured area must be positive")]
    InvalidArea,

    #[error("End date must be strictly after start date")]
    InvalidDateRange,

    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("Arithmetic overflow while computing {what}")]
    Overflow { what: &'static str },
}

impl ContractError {
    /// Stable numeric code reported in receipts
    pub fn code(&self) -> u32 {
        match self {
            ContractError::Unauthorized => 1,
            ContractError::InvalidArea => 2,
            ContractError::InvalidDateRange => 3,
            ContractError::InvalidState { .. } => 4,
            ContractError::NotFound { .. } => 5,
            ContractError::Overflow { .. } => 6,
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        ContractError::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        ContractError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

/// Host-level error type
#[derive(Debug, Error)]
pub enum CropShieldError {
    // Handler failures surfaced outside a receipt
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    // Snapshot and transaction-log storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Sequencer stopped or dropped a reply
    #[error("Sequencer unavailable: {0}")]
    Sequencer(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CropShieldError {
    fn from(err: serde_json::Error) -> Self {
        CropShieldError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CropShieldError {
    fn from(err: std::io::Error) -> Self {
        CropShieldError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for CropShieldError {
    fn from(err: anyhow::Error) -> Self {
        CropShieldError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ContractError::Unauthorized.code(), 1);
        assert_eq!(ContractError::InvalidArea.code(), 2);
        assert_eq!(ContractError::InvalidDateRange.code(), 3);
        assert_eq!(ContractError::invalid_state("cancelled").code(), 4);
        assert_eq!(ContractError::not_found("policy", 7).code(), 5);
        assert_eq!(ContractError::Overflow { what: "premium" }.code(), 6);
    }

    #[test]
    fn test_error_display() {
        let err = ContractError::not_found("claim", 42);
        assert_eq!(err.to_string(), "claim not found: 42");

        let err = CropShieldError::from(ContractError::Unauthorized);
        assert!(err.to_string().contains("not authorized"));
    }
}
