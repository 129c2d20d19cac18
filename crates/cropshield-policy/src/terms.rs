//! Crop terms and premium pricing

use cropshield_common::{ContractError, ContractResult, PERCENT_SCALE};
use serde::{Deserialize, Serialize};

/// Admin-set pricing terms for one crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropTerms {
    /// Premium per unit of area before risk loading
    pub base_premium: u64,
    /// Coverage per unit of area
    pub coverage_limit: u64,
    /// Percentage multiplier applied to `base_premium` (100 = neutral)
    pub risk_factor: u64,
}

/// Premium and coverage for a given area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub premium: u64,
    pub coverage: u64,
}

impl CropTerms {
    pub fn new(base_premium: u64, coverage_limit: u64, risk_factor: u64) -> Self {
        Self {
            base_premium,
            coverage_limit,
            risk_factor,
        }
    }

    /// Risk-loaded premium for one unit of area
    pub fn unit_premium(&self) -> ContractResult<u64> {
        let loaded = u128::from(self.base_premium) * u128::from(self.risk_factor)
            / u128::from(PERCENT_SCALE);
        u64::try_from(loaded).map_err(|_| ContractError::Overflow { what: "premium" })
    }

    /// Price `area` units under these terms
    pub fn quote(&self, area: u64) -> ContractResult<Quote> {
        let premium = area
            .checked_mul(self.unit_premium()?)
            .ok_or(ContractError::Overflow { what: "premium" })?;
        let coverage = area
            .checked_mul(self.coverage_limit)
            .ok_or(ContractError::Overflow { what: "coverage" })?;
        Ok(Quote { premium, coverage })
    }
}
