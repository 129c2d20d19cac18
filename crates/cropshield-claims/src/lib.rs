//! # Claims Processing
//!
//! Farmers file claims against active policies; the admin adjudicates them.
//!
//! ```text
//! pending ──process──▶ approved (payout = min(damage, coverage left))
//!    │
//!    └────reject─────▶ rejected (payout = 0)
//! ```
//!
//! Coverage is shared by every claim on a policy: approvals draw it down
//! and the total paid never exceeds it.
//!
//! Approval is an admin judgment. [`ClaimsProcessing::assess_claim`] gives
//! the admin a read-only view of what the oracle recorded for the claim.

pub mod assessment;
pub mod claim;
pub mod processing;

pub use assessment::ClaimAssessment;
pub use claim::{Claim, ClaimRequest, ClaimStatus};
pub use processing::ClaimsProcessing;
