//! # Policy Issuance
//!
//! Per-crop terms and the policy lifecycle.
//!
//! ## Pricing
//!
//! ```text
//! premium  = area * (base_premium * risk_factor / 100)
//! coverage = area * coverage_limit
//! ```
//!
//! Integer arithmetic, truncating toward zero. Both amounts are fixed at
//! issuance and never recomputed.

pub mod issuance;
pub mod policy;
pub mod terms;

pub use issuance::PolicyIssuance;
pub use policy::{Policy, PolicyStatus};
pub use terms::{CropTerms, Quote};
