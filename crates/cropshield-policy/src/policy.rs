//! Policy records

use cropshield_common::Principal;
use serde::{Deserialize, Serialize};

/// Policy lifecycle state. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Active,
    Cancelled,
}

impl std::fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyStatus::Active => write!(f, "active"),
            PolicyStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Issued area-based crop policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: u64,
    /// Owner; the only principal allowed to cancel
    pub farmer: Principal,
    pub crop: String,
    pub location: String,
    pub area: u64,
    pub premium: u64,
    /// Maximum total payout for this policy
    pub coverage: u64,
    pub start_date: u64,
    pub end_date: u64,
    pub status: PolicyStatus,
    /// Logical time of issuance
    pub issued_at: u64,
}

impl Policy {
    pub fn is_active(&self) -> bool {
        self.status == PolicyStatus::Active
    }

    /// Whether `date` falls inside `[start_date, end_date]`
    pub fn covers(&self, date: u64) -> bool {
        (self.start_date..=self.end_date).contains(&date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_window_is_inclusive() {
        let policy = Policy {
            id: 1,
            farmer: Principal::from("farmer"),
            crop: "wheat".to_string(),
            location: "Farm County, Region 3".to_string(),
            area: 50,
            premium: 30000,
            coverage: 500000,
            start_date: 1620000000,
            end_date: 1650000000,
            status: PolicyStatus::Active,
            issued_at: 5,
        };

        assert!(policy.covers(1620000000));
        assert!(policy.covers(1650000000));
        assert!(!policy.covers(1619999999));
        assert!(!policy.covers(1650000001));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PolicyStatus::Active).unwrap(), "\"active\"");
        assert_eq!(PolicyStatus::Cancelled.to_string(), "cancelled");
    }
}
