//! Transaction envelope, call surface and receipts
//!
//! Transactions travel as JSON, one per line:
//!
//! ```json
//! {"caller":"ST1PQ...","at":1620000100,"call":{"op":"purchase_policy","crop":"wheat",...}}
//! ```
//!
//! Unknown ops, unknown event types and malformed fields are rejected while
//! decoding, so they never reach a handler.

use cropshield_claims::{Claim, ClaimAssessment};
use cropshield_common::{ContractError, Principal};
use cropshield_oracle::WeatherRecord;
use cropshield_policy::{CropTerms, Policy};
use cropshield_risk::{EventThreshold, EventType, LocationEventHistory, RiskProfile};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed-and-verified call handed to the ledger by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Authenticated caller
    pub caller: Principal,
    /// Requested logical time; ignored when it lies in the past
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<u64>,
    pub call: Call,
}

impl Transaction {
    pub fn new(caller: impl Into<Principal>, call: Call) -> Self {
        Self {
            caller: caller.into(),
            at: None,
            call,
        }
    }

    pub fn at(mut self, at: u64) -> Self {
        self.at = Some(at);
        self
    }
}

/// State machine addressed by [`Call::SetAdmin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Oracle,
    Risk,
    Policy,
    Claims,
}

/// Every operation the ledger exposes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    // Weather oracle
    AuthorizeSource {
        source: String,
    },
    RevokeSource {
        source: String,
    },
    IsAuthorizedSource {
        source: String,
    },
    SubmitWeatherData {
        location: String,
        date: u64,
        temperature: i32,
        rainfall: u32,
        humidity: u32,
        wind_speed: u32,
        data_source: String,
    },
    GetWeatherData {
        location: String,
        date: u64,
    },

    // Risk assessment
    SetEventThreshold {
        event_type: EventType,
        rainfall_min: u32,
        temperature_max: i32,
        wind_speed_min: u32,
    },
    GetEventThreshold {
        event_type: EventType,
    },
    UpdateRiskProfile {
        location: String,
        crop: String,
        base_risk: u32,
        historical_loss: u32,
        climate_factor: u32,
        soil_quality: u32,
    },
    GetRiskProfile {
        location: String,
        crop: String,
    },
    RecordWeatherEvent {
        location: String,
        event_type: EventType,
    },
    CalculateRiskFactor {
        location: String,
        crop: String,
    },
    GetLocationHistory {
        location: String,
    },

    // Policy issuance
    SetCropTerms {
        crop: String,
        base_premium: u64,
        coverage_limit: u64,
        risk_factor: u64,
    },
    GetCropTerms {
        crop: String,
    },
    PurchasePolicy {
        crop: String,
        location: String,
        area: u64,
        start_date: u64,
        end_date: u64,
    },
    CancelPolicy {
        policy_id: u64,
    },
    GetPolicy {
        policy_id: u64,
    },
    PoliciesOf {
        farmer: Principal,
    },

    // Claims processing
    FileClaim {
        policy_id: u64,
        event_type: EventType,
        event_date: u64,
        location: String,
        damage_amount: u64,
    },
    ProcessClaim {
        claim_id: u64,
        damage_amount: u64,
    },
    RejectClaim {
        claim_id: u64,
    },
    GetClaim {
        claim_id: u64,
    },
    ClaimsForPolicy {
        policy_id: u64,
    },
    AssessClaim {
        claim_id: u64,
    },

    // Administration
    SetAdmin {
        component: Component,
        new_admin: Principal,
    },
}

impl Call {
    /// Reads neither advance the clock nor touch state
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Call::IsAuthorizedSource { .. }
                | Call::GetWeatherData { .. }
                | Call::GetEventThreshold { .. }
                | Call::GetRiskProfile { .. }
                | Call::CalculateRiskFactor { .. }
                | Call::GetLocationHistory { .. }
                | Call::GetCropTerms { .. }
                | Call::GetPolicy { .. }
                | Call::PoliciesOf { .. }
                | Call::GetClaim { .. }
                | Call::ClaimsForPolicy { .. }
                | Call::AssessClaim { .. }
        )
    }

    /// Operation name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Call::AuthorizeSource { .. } => "authorize_source",
            Call::RevokeSource { .. } => "revoke_source",
            Call::IsAuthorizedSource { .. } => "is_authorized_source",
            Call::SubmitWeatherData { .. } => "submit_weather_data",
            Call::GetWeatherData { .. } => "get_weather_data",
            Call::SetEventThreshold { .. } => "set_event_threshold",
            Call::GetEventThreshold { .. } => "get_event_threshold",
            Call::UpdateRiskProfile { .. } => "update_risk_profile",
            Call::GetRiskProfile { .. } => "get_risk_profile",
            Call::RecordWeatherEvent { .. } => "record_weather_event",
            Call::CalculateRiskFactor { .. } => "calculate_risk_factor",
            Call::GetLocationHistory { .. } => "get_location_history",
            Call::SetCropTerms { .. } => "set_crop_terms",
            Call::GetCropTerms { .. } => "get_crop_terms",
            Call::PurchasePolicy { .. } => "purchase_policy",
            Call::CancelPolicy { .. } => "cancel_policy",
            Call::GetPolicy { .. } => "get_policy",
            Call::PoliciesOf { .. } => "policies_of",
            Call::FileClaim { .. } => "file_claim",
            Call::ProcessClaim { .. } => "process_claim",
            Call::RejectClaim { .. } => "reject_claim",
            Call::GetClaim { .. } => "get_claim",
            Call::ClaimsForPolicy { .. } => "claims_for_policy",
            Call::AssessClaim { .. } => "assess_claim",
            Call::SetAdmin { .. } => "set_admin",
        }
    }
}

/// Success value of a call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CallOutput {
    Unit,
    Id(u64),
    Flag(bool),
    Amount(u64),
    WeatherRecord(WeatherRecord),
    Threshold(EventThreshold),
    RiskProfile(RiskProfile),
    History(LocationEventHistory),
    CropTerms(CropTerms),
    Policy(Policy),
    Policies(Vec<Policy>),
    Claim(Claim),
    Claims(Vec<Claim>),
    Assessment(ClaimAssessment),
}

/// Result of a call as recorded in its receipt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok { value: CallOutput },
    Err { code: u32, error: String },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok { .. })
    }

    /// Error code, if the call failed
    pub fn code(&self) -> Option<u32> {
        match self {
            Outcome::Ok { .. } => None,
            Outcome::Err { code, .. } => Some(*code),
        }
    }
}

impl From<Result<CallOutput, ContractError>> for Outcome {
    fn from(result: Result<CallOutput, ContractError>) -> Self {
        match result {
            Ok(value) => Outcome::Ok { value },
            Err(err) => Outcome::Err {
                code: err.code(),
                error: err.to_string(),
            },
        }
    }
}

/// Execution record of one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub tx_id: Uuid,
    pub op: &'static str,
    pub caller: Principal,
    /// Ledger height the call ran at
    pub height: u64,
    /// Logical time the call ran at
    pub at: u64,
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_purchase_policy() {
        let line = json!({
            "caller": "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            "at": 1620000100,
            "call": {
                "op": "purchase_policy",
                "crop": "wheat",
                "location": "Farm County, Region 3",
                "area": 50,
                "start_date": 1620000000,
                "end_date": 1650000000
            }
        });

        let tx: Transaction = serde_json::from_value(line).unwrap();
        assert_eq!(tx.at, Some(1620000100));
        assert_eq!(tx.call.name(), "purchase_policy");
        assert!(!tx.call.is_read_only());
        assert!(matches!(tx.call, Call::PurchasePolicy { area: 50, .. }));
    }

    #[test]
    fn test_decode_rejects_unknown_event_type() {
        let line = json!({
            "caller": "admin",
            "call": {"op": "record_weather_event", "location": "x", "event_type": "hail"}
        });
        assert!(serde_json::from_value::<Transaction>(line).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_op() {
        let line = json!({"caller": "admin", "call": {"op": "mint"}});
        assert!(serde_json::from_value::<Transaction>(line).is_err());
    }

    #[test]
    fn test_negative_temperature_decodes() {
        let line = json!({
            "caller": "station",
            "call": {
                "op": "submit_weather_data",
                "location": "Farm County, Region 3",
                "date": 1625000000,
                "temperature": -5,
                "rainfall": 150,
                "humidity": 80,
                "wind_speed": 25,
                "data_source": "National Weather Service"
            }
        });
        let tx: Transaction = serde_json::from_value(line).unwrap();
        assert!(matches!(tx.call, Call::SubmitWeatherData { temperature: -5, .. }));
    }

    #[test]
    fn test_outcome_wire_shape() {
        let ok = Outcome::from(Ok::<_, ContractError>(CallOutput::Id(1)));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"status": "ok", "value": 1}));

        let err = Outcome::from(Err::<CallOutput, _>(ContractError::InvalidDateRange));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["status"], "err");
        assert_eq!(value["code"], 3);
        assert_eq!(err.code(), Some(3));
    }

    #[test]
    fn test_unit_output_serializes_as_null() {
        let ok = Outcome::from(Ok::<_, ContractError>(CallOutput::Unit));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"status": "ok", "value": null}));
    }
}
