//! ClaimsProcessing state machine

use std::collections::BTreeMap;

use cropshield_common::{
    AdminGate, CallContext, ContractError, ContractResult, IdSequence, Principal,
};
use cropshield_oracle::WeatherOracle;
use cropshield_policy::PolicyIssuance;
use cropshield_risk::RiskAssessment;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::assessment::ClaimAssessment;
use crate::claim::{Claim, ClaimRequest, ClaimStatus};

/// Filed claims and the claim id counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimsProcessing {
    gate: AdminGate,
    claims: BTreeMap<u64, Claim>,
    claim_ids: IdSequence,
}

impl ClaimsProcessing {
    pub fn new(admin: impl Into<Principal>) -> Self {
        Self {
            gate: AdminGate::new(admin),
            claims: BTreeMap::new(),
            claim_ids: IdSequence::new(),
        }
    }

    pub fn admin(&self) -> &Principal {
        self.gate.admin()
    }

    pub fn set_admin(&mut self, ctx: &CallContext, new_admin: Principal) -> ContractResult<()> {
        self.gate.transfer(ctx, new_admin)
    }

    /// File a claim against an active policy whose window covers the event
    /// date. Thresholds are not consulted here.
    #[instrument(skip(self, ctx, policies), fields(caller = %ctx.caller))]
    pub fn file_claim(
        &mut self,
        ctx: &CallContext,
        policies: &PolicyIssuance,
        request: ClaimRequest,
    ) -> ContractResult<u64> {
        let policy = policies.get_policy(request.policy_id)?;
        if !policy.is_active() {
            return Err(ContractError::invalid_state(format!(
                "policy {} is {}",
                policy.id, policy.status
            )));
        }
        if !policy.covers(request.event_date) {
            return Err(ContractError::invalid_state(format!(
                "event date {} outside policy window [{}, {}]",
                request.event_date, policy.start_date, policy.end_date
            )));
        }
        let id = self.claim_ids.allocate()?;

        let claim = Claim {
            id,
            policy_id: request.policy_id,
            event_type: request.event_type,
            event_date: request.event_date,
            location: request.location,
            damage_amount: request.damage_amount,
            status: ClaimStatus::Pending,
            payout_amount: 0,
            timestamp: ctx.now,
            filed_by: ctx.caller.clone(),
            processed_at: None,
        };
        info!(claim_id = id, policy_id = claim.policy_id, event_type = %claim.event_type, "claim filed");
        self.claims.insert(id, claim);
        Ok(id)
    }

    /// Approve a pending claim. Admin only. The payout is `damage_amount`
    /// capped at what the referenced policy's coverage has left after earlier
    /// approvals, so a policy never pays more than its coverage in total.
    #[instrument(skip(self, ctx, policies), fields(caller = %ctx.caller))]
    pub fn process_claim(
        &mut self,
        ctx: &CallContext,
        policies: &PolicyIssuance,
        claim_id: u64,
        damage_amount: u64,
    ) -> ContractResult<()> {
        self.gate.ensure(ctx, "process_claim")?;
        let policy_id = Self::pending_mut(&mut self.claims, claim_id)?.policy_id;
        let coverage = policies.get_policy(policy_id)?.coverage;
        let remaining = coverage.saturating_sub(self.paid_out(policy_id));

        let payout = damage_amount.min(remaining);
        let claim = Self::pending_mut(&mut self.claims, claim_id)?;
        claim.status = ClaimStatus::Approved;
        claim.payout_amount = payout;
        claim.processed_at = Some(ctx.now);

        info!(claim_id, damage_amount, coverage, remaining, payout, "claim approved");
        Ok(())
    }

    /// Reject a pending claim. Admin only.
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn reject_claim(&mut self, ctx: &CallContext, claim_id: u64) -> ContractResult<()> {
        self.gate.ensure(ctx, "reject_claim")?;
        let claim = Self::pending_mut(&mut self.claims, claim_id)?;

        claim.status = ClaimStatus::Rejected;
        claim.payout_amount = 0;
        claim.processed_at = Some(ctx.now);

        info!(claim_id, "claim rejected");
        Ok(())
    }

    pub fn get_claim(&self, claim_id: u64) -> ContractResult<&Claim> {
        self.claims
            .get(&claim_id)
            .ok_or_else(|| ContractError::not_found("claim", claim_id))
    }

    /// Claims filed against `policy_id`, in id order
    pub fn claims_for_policy(&self, policy_id: u64) -> Vec<&Claim> {
        self.claims
            .values()
            .filter(|claim| claim.policy_id == policy_id)
            .collect()
    }

    /// Total approved payout against `policy_id`
    pub fn paid_out(&self, policy_id: u64) -> u64 {
        self.claims
            .values()
            .filter(|claim| claim.policy_id == policy_id && claim.status == ClaimStatus::Approved)
            .fold(0u64, |total, claim| total.saturating_add(claim.payout_amount))
    }

    /// Compare a claim with the oracle record and threshold for its
    /// location, date and event type. Read-only.
    pub fn assess_claim(
        &self,
        claim_id: u64,
        oracle: &WeatherOracle,
        risk: &RiskAssessment,
    ) -> ContractResult<ClaimAssessment> {
        let claim = self.get_claim(claim_id)?;
        let record = oracle.get_weather_data(&claim.location, claim.event_date).ok();
        let threshold = risk.get_event_threshold(claim.event_type).ok();

        let qualifies = match (record, threshold) {
            (Some(record), Some(threshold)) => {
                threshold.is_crossed_by(claim.event_type, &record.reading)
            }
            _ => false,
        };
        debug!(claim_id, qualifies, "claim assessed");

        Ok(ClaimAssessment {
            claim_id,
            record_found: record.is_some(),
            threshold_found: threshold.is_some(),
            qualifies,
            location_event_count: risk.get_location_history(&claim.location).count(claim.event_type),
        })
    }

    fn pending_mut(claims: &mut BTreeMap<u64, Claim>, claim_id: u64) -> ContractResult<&mut Claim> {
        let claim = claims
            .get_mut(&claim_id)
            .ok_or_else(|| ContractError::not_found("claim", claim_id))?;
        if !claim.is_pending() {
            return Err(ContractError::invalid_state(format!(
                "claim {claim_id} is {}",
                claim.status
            )));
        }
        Ok(claim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropshield_risk::{EventType, WeatherReading};

    const FARMER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    const LOCATION: &str = "Farm County, Region 3";

    fn admin(now: u64) -> CallContext {
        CallContext::new("admin", now)
    }

    fn farmer(now: u64) -> CallContext {
        CallContext::new(FARMER, now)
    }

    /// Wheat terms plus policy #1 (coverage 500000) owned by FARMER
    fn issued() -> PolicyIssuance {
        let mut policies = PolicyIssuance::new("admin");
        policies
            .set_crop_terms(&admin(1), "wheat", 500, 10000, 120)
            .unwrap();
        policies
            .purchase_policy(&farmer(5), "wheat", LOCATION, 50, 1620000000, 1650000000)
            .unwrap();
        policies
    }

    fn drought_claim(damage_amount: u64) -> ClaimRequest {
        ClaimRequest {
            policy_id: 1,
            event_type: EventType::Drought,
            event_date: 1630000000,
            location: LOCATION.to_string(),
            damage_amount,
        }
    }

    #[test]
    fn test_file_claim() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");

        let id = claims
            .file_claim(&farmer(15), &policies, drought_claim(5000))
            .unwrap();
        assert_eq!(id, 1);

        let claim = claims.get_claim(id).unwrap();
        assert_eq!(claim.policy_id, 1);
        assert_eq!(claim.event_type, EventType::Drought);
        assert_eq!(claim.damage_amount, 5000);
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.payout_amount, 0);
        assert_eq!(claim.timestamp, 15);
    }

    #[test]
    fn test_file_claim_missing_policy() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");
        let request = ClaimRequest {
            policy_id: 9,
            ..drought_claim(5000)
        };
        assert!(matches!(
            claims.file_claim(&farmer(15), &policies, request),
            Err(ContractError::NotFound { .. })
        ));
    }

    #[test]
    fn test_file_claim_outside_window() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");

        for event_date in [1619999999, 1650000001] {
            let request = ClaimRequest {
                event_date,
                ..drought_claim(5000)
            };
            assert!(matches!(
                claims.file_claim(&farmer(15), &policies, request),
                Err(ContractError::InvalidState { .. })
            ));
        }
        assert!(claims.get_claim(1).is_err());
    }

    #[test]
    fn test_file_claim_cancelled_policy() {
        let mut policies = issued();
        policies.cancel_policy(&farmer(6), 1).unwrap();
        let mut claims = ClaimsProcessing::new("admin");

        assert!(matches!(
            claims.file_claim(&farmer(15), &policies, drought_claim(5000)),
            Err(ContractError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_process_claim() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");
        let id = claims
            .file_claim(&farmer(15), &policies, drought_claim(5000))
            .unwrap();

        claims.process_claim(&admin(20), &policies, id, 5000).unwrap();

        let claim = claims.get_claim(id).unwrap();
        assert_eq!(claim.status, ClaimStatus::Approved);
        assert_eq!(claim.payout_amount, 5000);
        assert_eq!(claim.processed_at, Some(20));
    }

    #[test]
    fn test_process_claim_not_admin() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");
        let id = claims
            .file_claim(&farmer(15), &policies, drought_claim(5000))
            .unwrap();

        let result = claims.process_claim(&farmer(20), &policies, id, 5000);
        assert_eq!(result, Err(ContractError::Unauthorized));
        assert_eq!(result.unwrap_err().code(), 1);

        let claim = claims.get_claim(id).unwrap();
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.payout_amount, 0);
    }

    #[test]
    fn test_payout_capped_at_coverage() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");
        let id = claims
            .file_claim(&farmer(15), &policies, drought_claim(2_000_000))
            .unwrap();

        claims
            .process_claim(&admin(20), &policies, id, 2_000_000)
            .unwrap();
        assert_eq!(claims.get_claim(id).unwrap().payout_amount, 500000);
    }

    #[test]
    fn test_coverage_is_shared_across_claims() {
        let mut policies = PolicyIssuance::new("admin");
        policies
            .set_crop_terms(&admin(1), "wheat", 500, 10000, 120)
            .unwrap();
        policies
            .purchase_policy(&farmer(5), "wheat", LOCATION, 1, 1620000000, 1650000000)
            .unwrap();
        let mut claims = ClaimsProcessing::new("admin");
        for now in 15..18 {
            claims
                .file_claim(&farmer(now), &policies, drought_claim(6000))
                .unwrap();
        }

        claims.process_claim(&admin(20), &policies, 1, 6000).unwrap();
        claims.process_claim(&admin(21), &policies, 2, 6000).unwrap();
        claims.process_claim(&admin(22), &policies, 3, 6000).unwrap();

        assert_eq!(claims.get_claim(1).unwrap().payout_amount, 6000);
        assert_eq!(claims.get_claim(2).unwrap().payout_amount, 4000);
        assert_eq!(claims.get_claim(3).unwrap().payout_amount, 0);
        assert_eq!(claims.get_claim(3).unwrap().status, ClaimStatus::Approved);
        assert_eq!(claims.paid_out(1), 10000);
    }

    #[test]
    fn test_rejected_claims_do_not_use_coverage() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");
        claims.file_claim(&farmer(15), &policies, drought_claim(400000)).unwrap();
        claims.file_claim(&farmer(16), &policies, drought_claim(500000)).unwrap();

        claims.reject_claim(&admin(20), 1).unwrap();
        claims.process_claim(&admin(21), &policies, 2, 500000).unwrap();

        assert_eq!(claims.get_claim(2).unwrap().payout_amount, 500000);
        assert_eq!(claims.paid_out(1), 500000);
    }

    #[test]
    fn test_claim_processed_once() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");
        let id = claims
            .file_claim(&farmer(15), &policies, drought_claim(5000))
            .unwrap();
        claims.process_claim(&admin(20), &policies, id, 5000).unwrap();

        assert!(matches!(
            claims.process_claim(&admin(21), &policies, id, 9000),
            Err(ContractError::InvalidState { .. })
        ));
        assert!(matches!(
            claims.reject_claim(&admin(21), id),
            Err(ContractError::InvalidState { .. })
        ));
        assert_eq!(claims.get_claim(id).unwrap().payout_amount, 5000);
    }

    #[test]
    fn test_reject_claim() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");
        let id = claims
            .file_claim(&farmer(15), &policies, drought_claim(5000))
            .unwrap();

        assert_eq!(
            claims.reject_claim(&farmer(20), id),
            Err(ContractError::Unauthorized)
        );
        claims.reject_claim(&admin(20), id).unwrap();

        let claim = claims.get_claim(id).unwrap();
        assert_eq!(claim.status, ClaimStatus::Rejected);
        assert_eq!(claim.payout_amount, 0);
    }

    #[test]
    fn test_claims_for_policy() {
        let policies = issued();
        let mut claims = ClaimsProcessing::new("admin");
        claims.file_claim(&farmer(15), &policies, drought_claim(1)).unwrap();
        claims.file_claim(&farmer(16), &policies, drought_claim(2)).unwrap();

        assert_eq!(claims.claims_for_policy(1).len(), 2);
        assert!(claims.claims_for_policy(2).is_empty());
    }

    #[test]
    fn test_assess_claim() {
        let policies = issued();
        let mut risk = RiskAssessment::new("admin");
        let mut oracle = WeatherOracle::new("admin");
        let mut claims = ClaimsProcessing::new("admin");

        risk.set_event_threshold(&admin(2), EventType::Drought, 10, 35, 0)
            .unwrap();
        oracle.authorize_source(&admin(2), "NWS").unwrap();
        let id = claims
            .file_claim(&farmer(15), &policies, drought_claim(5000))
            .unwrap();

        let before = claims.assess_claim(id, &oracle, &risk).unwrap();
        assert!(!before.record_found);
        assert!(before.threshold_found);
        assert!(!before.qualifies);

        let dry = WeatherReading {
            temperature: 39,
            rainfall: 1,
            humidity: 12,
            wind_speed: 8,
        };
        oracle
            .submit_weather_data(&CallContext::new("station", 16), &mut risk, LOCATION, 1630000000, dry, "NWS")
            .unwrap();

        let after = claims.assess_claim(id, &oracle, &risk).unwrap();
        assert!(after.record_found);
        assert!(after.qualifies);
        assert_eq!(after.location_event_count, 1);
        assert_eq!(claims.get_claim(id).unwrap().status, ClaimStatus::Pending);
    }

    proptest::proptest! {
        #[test]
        fn prop_payout_never_exceeds_coverage(area in 1u64..1_000, damage in 0u64..u64::MAX) {
            let mut policies = PolicyIssuance::new("admin");
            policies.set_crop_terms(&admin(1), "wheat", 500, 10000, 120).unwrap();
            policies
                .purchase_policy(&farmer(5), "wheat", LOCATION, area, 1620000000, 1650000000)
                .unwrap();
            let mut claims = ClaimsProcessing::new("admin");
            let id = claims.file_claim(&farmer(15), &policies, drought_claim(damage)).unwrap();

            claims.process_claim(&admin(20), &policies, id, damage).unwrap();

            let coverage = policies.get_policy(1).unwrap().coverage;
            let claim = claims.get_claim(id).unwrap();
            proptest::prop_assert!(claim.payout_amount <= coverage);
            proptest::prop_assert_eq!(claim.payout_amount, damage.min(coverage));
        }

        #[test]
        fn prop_total_payout_never_exceeds_coverage(
            damages in proptest::collection::vec(0u64..400_000, 1..8)
        ) {
            let policies = issued();
            let mut claims = ClaimsProcessing::new("admin");
            for (i, damage) in damages.iter().enumerate() {
                let id = claims
                    .file_claim(&farmer(15 + i as u64), &policies, drought_claim(*damage))
                    .unwrap();
                claims.process_claim(&admin(100), &policies, id, *damage).unwrap();
            }

            let coverage = policies.get_policy(1).unwrap().coverage;
            let total: u64 = claims.claims_for_policy(1).iter().map(|c| c.payout_amount).sum();
            proptest::prop_assert!(total <= coverage);
            proptest::prop_assert_eq!(total, damages.iter().sum::<u64>().min(coverage));
        }
    }
}
