//! Ledger - serial execution of transactions against the four state machines

use cropshield_claims::{ClaimRequest, ClaimsProcessing};
use cropshield_common::{CallContext, ContractError, ContractResult, Principal, Result};
use cropshield_oracle::WeatherOracle;
use cropshield_policy::PolicyIssuance;
use cropshield_risk::{RiskAssessment, RiskFactors, WeatherReading};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::GenesisConfig;
use crate::snapshot::LedgerSnapshot;
use crate::transaction::{Call, CallOutput, Component, Outcome, Receipt, Transaction};
use crate::{DEFAULT_TICK, SNAPSHOT_VERSION};

/// All CropShield state plus the logical clock
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    oracle: WeatherOracle,
    risk: RiskAssessment,
    policies: PolicyIssuance,
    claims: ClaimsProcessing,
    /// Logical time of the last write
    clock: u64,
    /// Number of write transactions applied
    height: u64,
    /// Clock advance for writes that do not request a time
    tick: u64,
}

impl Ledger {
    /// Empty ledger where `admin` holds every admin role
    pub fn new(admin: &Principal, genesis_time: u64) -> Self {
        Self {
            oracle: WeatherOracle::new(admin.clone()),
            risk: RiskAssessment::new(admin.clone()),
            policies: PolicyIssuance::new(admin.clone()),
            claims: ClaimsProcessing::new(admin.clone()),
            clock: genesis_time,
            height: 0,
            tick: DEFAULT_TICK,
        }
    }

    /// Build a ledger and seed the admin registries from `genesis`
    pub fn from_genesis(genesis: &GenesisConfig, genesis_time: u64) -> ContractResult<Self> {
        let mut ledger = Self::new(&genesis.admin, genesis_time);
        let ctx = CallContext::new(genesis.admin.clone(), genesis_time);

        for source in &genesis.authorized_sources {
            ledger.oracle.authorize_source(&ctx, source)?;
        }
        for (event_type, threshold) in &genesis.event_thresholds {
            ledger.risk.set_event_threshold(
                &ctx,
                *event_type,
                threshold.rainfall_min,
                threshold.temperature_max,
                threshold.wind_speed_min,
            )?;
        }
        for (crop, terms) in &genesis.crop_terms {
            ledger.policies.set_crop_terms(
                &ctx,
                crop,
                terms.base_premium,
                terms.coverage_limit,
                terms.risk_factor,
            )?;
        }

        info!(
            admin = %genesis.admin,
            sources = genesis.authorized_sources.len(),
            thresholds = genesis.event_thresholds.len(),
            crops = genesis.crop_terms.len(),
            "ledger initialised from genesis"
        );
        Ok(ledger)
    }

    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    pub fn oracle(&self) -> &WeatherOracle {
        &self.oracle
    }

    pub fn risk(&self) -> &RiskAssessment {
        &self.risk
    }

    pub fn policies(&self) -> &PolicyIssuance {
        &self.policies
    }

    pub fn claims(&self) -> &ClaimsProcessing {
        &self.claims
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    /// Run one transaction to completion.
    ///
    /// A successful write advances the height and moves the clock to the
    /// transaction's time. A failing call leaves the whole ledger untouched,
    /// clock and height included. Reads run at the current clock.
    #[instrument(skip(self, tx), fields(op = tx.call.name(), caller = %tx.caller))]
    pub fn apply(&mut self, tx: Transaction) -> Receipt {
        let op = tx.call.name();
        let read_only = tx.call.is_read_only();

        let now = match tx.at {
            _ if read_only => self.clock,
            Some(at) if at >= self.clock => at,
            _ => self.clock.saturating_add(self.tick),
        };

        let ctx = CallContext::new(tx.caller.clone(), now);
        let result = self.dispatch(&ctx, tx.call);
        match &result {
            Ok(_) if read_only => debug!(op, "read served"),
            Ok(_) => {
                self.clock = now;
                self.height = self.height.saturating_add(1);
                info!(op, height = self.height, at = now, "transaction applied");
            }
            Err(err) => warn!(op, code = err.code(), %err, at = now, "transaction rejected"),
        }

        Receipt {
            tx_id: Uuid::now_v7(),
            op,
            caller: tx.caller,
            height: self.height,
            at: now,
            outcome: Outcome::from(result),
        }
    }

    fn dispatch(&mut self, ctx: &CallContext, call: Call) -> ContractResult<CallOutput> {
        let output = match call {
            Call::AuthorizeSource { source } => {
                self.oracle.authorize_source(ctx, &source)?;
                CallOutput::Unit
            }
            Call::RevokeSource { source } => {
                self.oracle.revoke_source(ctx, &source)?;
                CallOutput::Unit
            }
            Call::IsAuthorizedSource { source } => {
                CallOutput::Flag(self.oracle.is_authorized_source(&source))
            }
            Call::SubmitWeatherData {
                location,
                date,
                temperature,
                rainfall,
                humidity,
                wind_speed,
                data_source,
            } => {
                let reading = WeatherReading {
                    temperature,
                    rainfall,
                    humidity,
                    wind_speed,
                };
                let id = self.oracle.submit_weather_data(
                    ctx,
                    &mut self.risk,
                    &location,
                    date,
                    reading,
                    &data_source,
                )?;
                CallOutput::Id(id)
            }
            Call::GetWeatherData { location, date } => {
                CallOutput::WeatherRecord(self.oracle.get_weather_data(&location, date)?.clone())
            }

            Call::SetEventThreshold {
                event_type,
                rainfall_min,
                temperature_max,
                wind_speed_min,
            } => {
                self.risk.set_event_threshold(
                    ctx,
                    event_type,
                    rainfall_min,
                    temperature_max,
                    wind_speed_min,
                )?;
                CallOutput::Unit
            }
            Call::GetEventThreshold { event_type } => {
                CallOutput::Threshold(*self.risk.get_event_threshold(event_type)?)
            }
            Call::UpdateRiskProfile {
                location,
                crop,
                base_risk,
                historical_loss,
                climate_factor,
                soil_quality,
            } => {
                let factors =
                    RiskFactors::new(base_risk, historical_loss, climate_factor, soil_quality);
                self.risk
                    .update_risk_profile(ctx, &location, &crop, factors)?;
                CallOutput::Unit
            }
            Call::GetRiskProfile { location, crop } => {
                CallOutput::RiskProfile(*self.risk.get_risk_profile(&location, &crop)?)
            }
            Call::RecordWeatherEvent {
                location,
                event_type,
            } => {
                self.risk.record_weather_event(ctx, &location, event_type)?;
                CallOutput::Unit
            }
            Call::CalculateRiskFactor { location, crop } => {
                CallOutput::Amount(self.risk.calculate_risk_factor(&location, &crop)?)
            }
            Call::GetLocationHistory { location } => {
                CallOutput::History(self.risk.get_location_history(&location))
            }

            Call::SetCropTerms {
                crop,
                base_premium,
                coverage_limit,
                risk_factor,
            } => {
                self.policies.set_crop_terms(
                    ctx,
                    &crop,
                    base_premium,
                    coverage_limit,
                    risk_factor,
                )?;
                CallOutput::Unit
            }
            Call::GetCropTerms { crop } => {
                CallOutput::CropTerms(*self.policies.get_crop_terms(&crop)?)
            }
            Call::PurchasePolicy {
                crop,
                location,
                area,
                start_date,
                end_date,
            } => {
                let id = self.policies.purchase_policy(
                    ctx,
                    &crop,
                    &location,
                    area,
                    start_date,
                    end_date,
                )?;
                CallOutput::Id(id)
            }
            Call::CancelPolicy { policy_id } => {
                self.policies.cancel_policy(ctx, policy_id)?;
                CallOutput::Unit
            }
            Call::GetPolicy { policy_id } => {
                CallOutput::Policy(self.policies.get_policy(policy_id)?.clone())
            }
            Call::PoliciesOf { farmer } => CallOutput::Policies(
                self.policies
                    .policies_of(&farmer)
                    .into_iter()
                    .cloned()
                    .collect(),
            ),

            Call::FileClaim {
                policy_id,
                event_type,
                event_date,
                location,
                damage_amount,
            } => {
                let request = ClaimRequest {
                    policy_id,
                    event_type,
                    event_date,
                    location,
                    damage_amount,
                };
                CallOutput::Id(self.claims.file_claim(ctx, &self.policies, request)?)
            }
            Call::ProcessClaim {
                claim_id,
                damage_amount,
            } => {
                self.claims
                    .process_claim(ctx, &self.policies, claim_id, damage_amount)?;
                CallOutput::Unit
            }
            Call::RejectClaim { claim_id } => {
                self.claims.reject_claim(ctx, claim_id)?;
                CallOutput::Unit
            }
            Call::GetClaim { claim_id } => {
                CallOutput::Claim(self.claims.get_claim(claim_id)?.clone())
            }
            Call::ClaimsForPolicy { policy_id } => CallOutput::Claims(
                self.claims
                    .claims_for_policy(policy_id)
                    .into_iter()
                    .cloned()
                    .collect(),
            ),
            Call::AssessClaim { claim_id } => CallOutput::Assessment(
                self.claims
                    .assess_claim(claim_id, &self.oracle, &self.risk)?,
            ),

            Call::SetAdmin {
                component,
                new_admin,
            } => {
                match component {
                    Component::Oracle => self.oracle.set_admin(ctx, new_admin)?,
                    Component::Risk => self.risk.set_admin(ctx, new_admin)?,
                    Component::Policy => self.policies.set_admin(ctx, new_admin)?,
                    Component::Claims => self.claims.set_admin(ctx, new_admin)?,
                }
                CallOutput::Unit
            }
        };
        Ok(output)
    }

    /// Copy of the full state
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            clock: self.clock,
            height: self.height,
            oracle: self.oracle.clone(),
            risk: self.risk.clone(),
            policies: self.policies.clone(),
            claims: self.claims.clone(),
        }
    }

    /// Rebuild a ledger from a snapshot
    pub fn restore(snapshot: LedgerSnapshot) -> ContractResult<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ContractError::invalid_state(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(Self {
            oracle: snapshot.oracle,
            risk: snapshot.risk,
            policies: snapshot.policies,
            claims: snapshot.claims,
            clock: snapshot.clock,
            height: snapshot.height,
            tick: DEFAULT_TICK,
        })
    }

    /// BLAKE3 digest of the canonical snapshot encoding, hex encoded
    pub fn state_root(&self) -> Result<String> {
        self.snapshot().root()
    }
}
