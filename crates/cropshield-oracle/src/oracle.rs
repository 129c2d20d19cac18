//! WeatherOracle state machine

use std::collections::{BTreeMap, BTreeSet};

use cropshield_common::{
    AdminGate, CallContext, ContractError, ContractResult, IdSequence, Principal,
};
use cropshield_risk::{RiskAssessment, WeatherReading};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::record::WeatherRecord;

/// Weather records, authorized sources and the submission counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherOracle {
    gate: AdminGate,
    authorized_sources: BTreeSet<String>,
    /// location -> date -> record
    records: BTreeMap<String, BTreeMap<u64, WeatherRecord>>,
    submissions: IdSequence,
}

impl WeatherOracle {
    pub fn new(admin: impl Into<Principal>) -> Self {
        Self {
            gate: AdminGate::new(admin),
            authorized_sources: BTreeSet::new(),
            records: BTreeMap::new(),
            submissions: IdSequence::new(),
        }
    }

    pub fn admin(&self) -> &Principal {
        self.gate.admin()
    }

    pub fn set_admin(&mut self, ctx: &CallContext, new_admin: Principal) -> ContractResult<()> {
        self.gate.transfer(ctx, new_admin)
    }

    /// Add a data source to the authorized set. Admin only.
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn authorize_source(&mut self, ctx: &CallContext, source: &str) -> ContractResult<()> {
        self.gate.ensure(ctx, "authorize_source")?;
        if self.authorized_sources.insert(source.to_string()) {
            info!(source, "data source authorized");
        } else {
            debug!(source, "data source already authorized");
        }
        Ok(())
    }

    /// Remove a data source from the authorized set. Admin only.
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn revoke_source(&mut self, ctx: &CallContext, source: &str) -> ContractResult<()> {
        self.gate.ensure(ctx, "revoke_source")?;
        if self.authorized_sources.remove(source) {
            info!(source, "data source revoked");
        } else {
            debug!(source, "data source was not authorized");
        }
        Ok(())
    }

    pub fn is_authorized_source(&self, source: &str) -> bool {
        self.authorized_sources.contains(source)
    }

    /// Number of accepted submissions (also the last submission id)
    pub fn submission_count(&self) -> u64 {
        self.submissions.current()
    }

    /// Accept an observation from an authorized source.
    ///
    /// Overwrites any earlier record for (location, date), then records each
    /// event type whose threshold the reading crosses in `risk`, stamped with
    /// the observation date. Returns the new submission id.
    #[instrument(skip(self, ctx, risk), fields(caller = %ctx.caller))]
    pub fn submit_weather_data(
        &mut self,
        ctx: &CallContext,
        risk: &mut RiskAssessment,
        location: &str,
        date: u64,
        reading: WeatherReading,
        data_source: &str,
    ) -> ContractResult<u64> {
        if !self.is_authorized_source(data_source) {
            warn!(data_source, "rejected weather data from unauthorized source");
            return Err(ContractError::Unauthorized);
        }
        // Last fallible step; everything after it is infallible.
        let id = self.submissions.allocate()?;
        let events = risk.qualifying_events(&reading);

        let record = WeatherRecord {
            location: location.to_string(),
            date,
            reading,
            data_source: data_source.to_string(),
            submitted_at: ctx.now,
        };
        let replaced = self
            .records
            .entry(location.to_string())
            .or_default()
            .insert(date, record)
            .is_some();

        for event in &events {
            risk.record_qualifying_event(location, *event, date);
        }

        info!(
            id,
            location,
            date,
            replaced,
            qualifying = events.len(),
            "weather data accepted"
        );
        Ok(id)
    }

    pub fn get_weather_data(&self, location: &str, date: u64) -> ContractResult<&WeatherRecord> {
        self.records
            .get(location)
            .and_then(|by_date| by_date.get(&date))
            .ok_or_else(|| ContractError::not_found("weather record", format!("{location}@{date}")))
    }
}
