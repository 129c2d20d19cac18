//! # CropShield Common
//!
//! Shared types and errors for the CropShield parametric crop-insurance ledger.
//!
//! ## Core Types
//!
//! - [`Principal`]: authenticated caller identity handed in by the host
//! - [`CallContext`]: caller plus the logical time of the running transaction
//! - [`IdSequence`]: per-table sequential id counter
//! - [`AdminGate`]: the admin role held by each state machine
//!
//! ## Errors
//!
//! - [`ContractError`]: the in-core failure taxonomy with stable numeric codes
//! - [`CropShieldError`]: host-level errors (config, storage, serialization)

pub mod access;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use access::AdminGate;
pub use error::{ContractError, ContractResult, CropShieldError, Result};
pub use types::{
    context::CallContext,
    principal::Principal,
    sequence::IdSequence,
};

/// CropShield version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Percentage scale used by every multiplier (100 = neutral)
pub const PERCENT_SCALE: u64 = 100;
