//! Claim records

use cropshield_common::Principal;
use cropshield_risk::EventType;
use serde::{Deserialize, Serialize};

/// Claim adjudication state. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Pending => write!(f, "pending"),
            ClaimStatus::Approved => write!(f, "approved"),
            ClaimStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// What a filer submits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub policy_id: u64,
    pub event_type: EventType,
    pub event_date: u64,
    pub location: String,
    /// Damage estimated by the filer
    pub damage_amount: u64,
}

/// Filed claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: u64,
    pub policy_id: u64,
    pub event_type: EventType,
    pub event_date: u64,
    pub location: String,
    pub damage_amount: u64,
    pub status: ClaimStatus,
    /// Set on approval only; never above the policy's coverage
    pub payout_amount: u64,
    /// Logical time of filing
    pub timestamp: u64,
    pub filed_by: Principal,
    /// Logical time of adjudication
    pub processed_at: Option<u64>,
}

impl Claim {
    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }
}
