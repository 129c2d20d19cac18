//! Node configuration

use std::collections::BTreeMap;
use std::path::PathBuf;

use cropshield_common::{CropShieldError, Principal, Result};
use cropshield_policy::CropTerms;
use cropshield_risk::{EventThreshold, EventType};
use serde::{Deserialize, Serialize};

/// Default config file, overridden by `CROPSHIELD_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "cropshield.toml";

/// CropShield node configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Registries seeded into a fresh ledger
    pub genesis: GenesisConfig,
    /// Clock and sequencer settings
    pub ledger: LedgerSettings,
    /// Snapshot persistence
    pub storage: StorageSettings,
    /// Transaction input
    pub input: InputSettings,
}

impl NodeConfig {
    /// Load configuration from `.env`, the config file and the environment.
    ///
    /// Environment keys use the `CROPSHIELD__` prefix with `__` between
    /// sections, e.g. `CROPSHIELD__STORAGE__SNAPSHOT_PATH=/var/lib/cropshield.json`.
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let path = std::env::var("CROPSHIELD_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("CROPSHIELD").separator("__"))
            .build()
            .map_err(|e| CropShieldError::Config(format!("Failed to read {}: {}", path, e)))?;

        settings
            .try_deserialize()
            .map_err(|e| CropShieldError::Config(format!("Invalid configuration: {}", e)))
    }
}

/// Genesis registries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Holder of every admin role at genesis
    pub admin: Principal,
    /// Weather data sources trusted from the start
    pub authorized_sources: Vec<String>,
    /// Crop name -> terms
    pub crop_terms: BTreeMap<String, CropTerms>,
    /// Event type -> qualification threshold
    pub event_thresholds: BTreeMap<EventType, EventThreshold>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            admin: Principal::from("deployer"),
            authorized_sources: vec![],
            crop_terms: BTreeMap::new(),
            event_thresholds: BTreeMap::new(),
        }
    }
}

/// Logical clock and sequencer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Clock value before the first transaction
    pub genesis_time: u64,
    /// Clock advance for writes without a requested time
    pub tick: u64,
    /// Sequencer queue bound
    pub queue_depth: usize,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            genesis_time: 0,
            tick: crate::DEFAULT_TICK,
            queue_depth: crate::DEFAULT_QUEUE_DEPTH,
        }
    }
}

/// Snapshot persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Loaded at start when present, written at shutdown
    pub snapshot_path: Option<PathBuf>,
}

/// Transaction input settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// JSON-lines transaction file; stdin when unset
    pub transactions_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.genesis.admin.as_str(), "deployer");
        assert_eq!(config.ledger.tick, 1);
        assert_eq!(config.ledger.queue_depth, 1024);
        assert!(config.storage.snapshot_path.is_none());
        assert!(config.input.transactions_path.is_none());
    }

    #[test]
    fn test_genesis_from_json() {
        let genesis: GenesisConfig = serde_json::from_value(serde_json::json!({
            "admin": "insurer",
            "authorized_sources": ["National Weather Service"],
            "crop_terms": {
                "wheat": {"base_premium": 500, "coverage_limit": 10000, "risk_factor": 120}
            },
            "event_thresholds": {
                "drought": {"rainfall_min": 10, "temperature_max": 35, "wind_speed_min": 0}
            }
        }))
        .unwrap();

        assert_eq!(genesis.admin.as_str(), "insurer");
        assert_eq!(genesis.crop_terms["wheat"].risk_factor, 120);
        assert_eq!(genesis.event_thresholds[&EventType::Drought].rainfall_min, 10);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: NodeConfig =
            serde_json::from_value(serde_json::json!({"ledger": {"tick": 10}})).unwrap();
        assert_eq!(config.ledger.tick, 10);
        assert_eq!(config.ledger.queue_depth, 1024);
        assert_eq!(config.genesis.admin.as_str(), "deployer");
    }
}
