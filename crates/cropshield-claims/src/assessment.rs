//! Advisory evidence check for pending claims

use serde::{Deserialize, Serialize};

/// What the oracle and thresholds say about a claim.
///
/// Purely informational: it never moves a claim between states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAssessment {
    pub claim_id: u64,
    /// A weather record exists at (claim location, event date)
    pub record_found: bool,
    /// A threshold is registered for the claimed event type
    pub threshold_found: bool,
    /// The record crosses the threshold for the claimed event type
    pub qualifies: bool,
    /// Events already counted for the claim location
    pub location_event_count: u64,
}
