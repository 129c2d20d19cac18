//! RiskAssessment state machine
//!
//! Owns three tables:
//! - event thresholds keyed by [`EventType`]
//! - risk profiles keyed by (location, crop)
//! - event history keyed by location
//!
//! The weather oracle drives [`RiskAssessment::record_qualifying_event`] from
//! its write path. Nothing in this crate calls back into the oracle.

use std::collections::BTreeMap;

use cropshield_common::{AdminGate, CallContext, ContractError, ContractResult, Principal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::event::{EventType, WeatherReading};
use crate::history::LocationEventHistory;
use crate::profile::{RiskFactors, RiskProfile};
use crate::threshold::EventThreshold;

/// Risk assessment tables and their admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    gate: AdminGate,
    thresholds: BTreeMap<EventType, EventThreshold>,
    /// location -> crop -> profile
    profiles: BTreeMap<String, BTreeMap<String, RiskProfile>>,
    histories: BTreeMap<String, LocationEventHistory>,
}

impl RiskAssessment {
    pub fn new(admin: impl Into<Principal>) -> Self {
        Self {
            gate: AdminGate::new(admin),
            thresholds: BTreeMap::new(),
            profiles: BTreeMap::new(),
            histories: BTreeMap::new(),
        }
    }

    pub fn admin(&self) -> &Principal {
        self.gate.admin()
    }

    pub fn set_admin(&mut self, ctx: &CallContext, new_admin: Principal) -> ContractResult<()> {
        self.gate.transfer(ctx, new_admin)
    }

    /// Create or overwrite the threshold for `event_type`. Admin only.
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn set_event_threshold(
        &mut self,
        ctx: &CallContext,
        event_type: EventType,
        rainfall_min: u32,
        temperature_max: i32,
        wind_speed_min: u32,
    ) -> ContractResult<()> {
        self.gate.ensure(ctx, "set_event_threshold")?;

        let threshold = EventThreshold::new(rainfall_min, temperature_max, wind_speed_min);
        self.thresholds.insert(event_type, threshold);
        info!(%event_type, ?threshold, "event threshold set");
        Ok(())
    }

    pub fn get_event_threshold(&self, event_type: EventType) -> ContractResult<&EventThreshold> {
        self.thresholds
            .get(&event_type)
            .ok_or_else(|| ContractError::not_found("event threshold", event_type))
    }

    /// Upsert the profile for (location, crop). Admin only.
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn update_risk_profile(
        &mut self,
        ctx: &CallContext,
        location: &str,
        crop: &str,
        factors: RiskFactors,
    ) -> ContractResult<()> {
        self.gate.ensure(ctx, "update_risk_profile")?;

        let profile = RiskProfile {
            factors,
            last_updated: ctx.now,
        };
        self.profiles
            .entry(location.to_string())
            .or_default()
            .insert(crop.to_string(), profile);
        info!(location, crop, last_updated = ctx.now, "risk profile updated");
        Ok(())
    }

    pub fn get_risk_profile(&self, location: &str, crop: &str) -> ContractResult<&RiskProfile> {
        self.profiles
            .get(location)
            .and_then(|crops| crops.get(crop))
            .ok_or_else(|| ContractError::not_found("risk profile", format!("{location}/{crop}")))
    }

    /// Percentage-scaled risk multiplier for (location, crop)
    pub fn calculate_risk_factor(&self, location: &str, crop: &str) -> ContractResult<u64> {
        let profile = self.get_risk_profile(location, crop)?;
        let factor = profile.factors.risk_factor()?;
        debug!(location, crop, factor, "risk factor calculated");
        Ok(factor)
    }

    /// Manual correction of a location's event history. Admin only; stamps
    /// `last_event` with the current logical time.
    #[instrument(skip(self, ctx), fields(caller = %ctx.caller))]
    pub fn record_weather_event(
        &mut self,
        ctx: &CallContext,
        location: &str,
        event_type: EventType,
    ) -> ContractResult<()> {
        self.gate.ensure(ctx, "record_weather_event")?;
        self.record_qualifying_event(location, event_type, ctx.now);
        Ok(())
    }

    /// Count a qualifying event detected by the oracle. Only reachable through
    /// the oracle's write path; the host never exposes it as a call.
    pub fn record_qualifying_event(&mut self, location: &str, event_type: EventType, at: u64) {
        let history = self.histories.entry(location.to_string()).or_default();
        history.record(event_type, at);
        info!(
            location,
            %event_type,
            count = history.count(event_type),
            last_event = at,
            "weather event recorded"
        );
    }

    /// History for `location`; zeroed when nothing was ever recorded
    pub fn get_location_history(&self, location: &str) -> LocationEventHistory {
        self.histories.get(location).copied().unwrap_or_default()
    }

    /// Event types whose registered threshold `reading` crosses
    pub fn qualifying_events(&self, reading: &WeatherReading) -> Vec<EventType> {
        self.thresholds
            .iter()
            .filter(|(event, threshold)| threshold.is_crossed_by(**event, reading))
            .map(|(event, _)| *event)
            .collect()
    }
}
