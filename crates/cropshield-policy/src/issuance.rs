//! PolicyIssuance state machine

use std::collections::BTreeMap;

use cropshield_common::{
    AdminGate, CallContext, ContractError, ContractResult, IdSequence, Principal,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::policy::{Policy, PolicyStatus};
use crate::terms::CropTerms;

/// Crop terms, issued policies and the policy id counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyIssuance {
    gate: AdminGate,
    crop_terms: BTreeMap<String, CropTerms>,
    policies: BTreeMap<u64, Policy>,
    policy_ids: IdSequence,
}

impl PolicyIssuance {
    pub fn new(admin: impl Into<Principal>) -> Self {
        Self {
            gate: AdminGate::new(admin),
            crop_terms: BTreeMap::new(),
            policies: BTreeMap::new(),
            policy_ids: IdSequence::new(),
        }
    }

    pub fn admin(&self) -> &Principal {
        self.gate.admin()
    }

    pub fn set_admin(&mut self, ctx: &CallContext, new_admin: Principal) -> ContractResult<()> {
        self.gate.transfer(ctx, new_admin)
    }

    /// Create or overwrite the terms for `crop`. Admin only. Policies already
    /// issued keep the premium and coverage they were priced with.
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn set_crop_terms(
        &mut self,
        ctx: &CallContext,
        crop: &str,
        base_premium: u64,
        coverage_limit: u64,
        risk_factor: u64,
    ) -> ContractResult<()> {
        self.gate.ensure(ctx, "set_crop_terms")?;

        let terms = CropTerms::new(base_premium, coverage_limit, risk_factor);
        self.crop_terms.insert(crop.to_string(), terms);
        info!(crop, ?terms, "crop terms set");
        Ok(())
    }

    pub fn get_crop_terms(&self, crop: &str) -> ContractResult<&CropTerms> {
        self.crop_terms
            .get(crop)
            .ok_or_else(|| ContractError::not_found("crop terms", crop))
    }

    /// Issue a policy to the caller and return its id
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn purchase_policy(
        &mut self,
        ctx: &CallContext,
        crop: &str,
        location: &str,
        area: u64,
        start_date: u64,
        end_date: u64,
    ) -> ContractResult<u64> {
        if area == 0 {
            return Err(ContractError::InvalidArea);
        }
        if start_date >= end_date {
            return Err(ContractError::InvalidDateRange);
        }
        let quote = self.get_crop_terms(crop)?.quote(area)?;
        let id = self.policy_ids.allocate()?;

        let policy = Policy {
            id,
            farmer: ctx.caller.clone(),
            crop: crop.to_string(),
            location: location.to_string(),
            area,
            premium: quote.premium,
            coverage: quote.coverage,
            start_date,
            end_date,
            status: PolicyStatus::Active,
            issued_at: ctx.now,
        };
        self.policies.insert(id, policy);

        info!(
            policy_id = id,
            premium = quote.premium,
            coverage = quote.coverage,
            "policy issued"
        );
        Ok(id)
    }

    /// Cancel an active policy. Only its farmer may cancel; cancellation is final.
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn cancel_policy(&mut self, ctx: &CallContext, policy_id: u64) -> ContractResult<()> {
        let policy = self
            .policies
            .get_mut(&policy_id)
            .ok_or_else(|| ContractError::not_found("policy", policy_id))?;

        if policy.farmer != ctx.caller {
            warn!(policy_id, owner = %policy.farmer, "cancel attempted by non-owner");
            return Err(ContractError::Unauthorized);
        }
        if !policy.is_active() {
            return Err(ContractError::invalid_state(format!(
                "policy {policy_id} is {}",
                policy.status
            )));
        }

        policy.status = PolicyStatus::Cancelled;
        info!(policy_id, "policy cancelled");
        Ok(())
    }

    pub fn get_policy(&self, policy_id: u64) -> ContractResult<&Policy> {
        self.policies
            .get(&policy_id)
            .ok_or_else(|| ContractError::not_found("policy", policy_id))
    }

    /// All policies owned by `farmer`, in id order
    pub fn policies_of(&self, farmer: &Principal) -> Vec<&Policy> {
        self.policies
            .values()
            .filter(|policy| &policy.farmer == farmer)
            .collect()
    }

    /// Number of policies ever issued
    pub fn policy_count(&self) -> u64 {
        self.policy_ids.current()
    }
}
