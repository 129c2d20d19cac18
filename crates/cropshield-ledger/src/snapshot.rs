//! Ledger snapshots
//!
//! A snapshot holds the four key-value namespaces (weather records, risk
//! data, policies, claims), the admin registries and the counters. Every
//! table is a `BTreeMap`, so the JSON encoding is canonical and the state root
//! only depends on content.

use std::path::Path;

use cropshield_claims::ClaimsProcessing;
use cropshield_common::{CropShieldError, Result};
use cropshield_oracle::WeatherOracle;
use cropshield_policy::PolicyIssuance;
use cropshield_risk::RiskAssessment;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Full ledger state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub clock: u64,
    pub height: u64,
    pub oracle: WeatherOracle,
    pub risk: RiskAssessment,
    pub policies: PolicyIssuance,
    pub claims: ClaimsProcessing,
}

impl LedgerSnapshot {
    /// BLAKE3 digest of the canonical JSON encoding, hex encoded
    pub fn root(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

/// On-disk wrapper around a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Wall-clock save time (Unix milliseconds)
    pub saved_at: i64,
    pub state_root: String,
    pub snapshot: LedgerSnapshot,
}

impl SnapshotFile {
    pub fn new(snapshot: LedgerSnapshot) -> Result<Self> {
        Ok(Self {
            saved_at: chrono::Utc::now().timestamp_millis(),
            state_root: snapshot.root()?,
            snapshot,
        })
    }

    /// Write the snapshot as pretty JSON, replacing `path` atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        info!(path = %path.display(), state_root = %self.state_root, "snapshot saved");
        Ok(())
    }

    /// Read a snapshot and check its recorded state root
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: SnapshotFile = serde_json::from_str(&content)?;

        let root = file.snapshot.root()?;
        if root != file.state_root {
            return Err(CropShieldError::Storage(format!(
                "snapshot {} is corrupt: state root {} != recorded {}",
                path.display(),
                root,
                file.state_root
            )));
        }
        debug!(path = %path.display(), state_root = %root, "snapshot loaded");
        Ok(file)
    }
}
