//! Risk profiles and the risk-factor formula

use cropshield_common::{ContractError, ContractResult};
use serde::{Deserialize, Serialize};

/// Historical loss percentage treated as neutral
pub const BASELINE_HISTORICAL_LOSS: i128 = 10;

/// Soil quality score treated as neutral
pub const BASELINE_SOIL_QUALITY: i128 = 80;

/// Admin-set inputs of a risk profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    /// Percentage-scaled base risk (100 = neutral)
    pub base_risk: u32,
    /// Historical loss percentage
    pub historical_loss: u32,
    /// Percentage-scaled climate multiplier (100 = neutral)
    pub climate_factor: u32,
    /// Soil quality score, higher is better
    pub soil_quality: u32,
}

impl RiskFactors {
    pub fn new(base_risk: u32, historical_loss: u32, climate_factor: u32, soil_quality: u32) -> Self {
        Self {
            base_risk,
            historical_loss,
            climate_factor,
            soil_quality,
        }
    }

    /// Percentage-scaled risk multiplier.
    ///
    /// `max(0, base * climate / 100 + (loss - 10) - (soil - 80))`, integer
    /// division truncating toward zero.
    pub fn risk_factor(&self) -> ContractResult<u64> {
        let climate_adjusted =
            i128::from(self.base_risk) * i128::from(self.climate_factor) / 100;
        let loss_loading = i128::from(self.historical_loss) - BASELINE_HISTORICAL_LOSS;
        let soil_credit = i128::from(self.soil_quality) - BASELINE_SOIL_QUALITY;

        let factor = (climate_adjusted + loss_loading - soil_credit).max(0);
        u64::try_from(factor).map_err(|_| ContractError::Overflow { what: "risk factor" })
    }
}

/// Stored profile for one (location, crop) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    #[serde(flatten)]
    pub factors: RiskFactors,
    /// Logical time of the last write
    pub last_updated: u64,
}
