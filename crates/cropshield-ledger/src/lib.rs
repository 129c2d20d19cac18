//! # CropShield Ledger
//!
//! Hosts the four CropShield state machines behind a single serial
//! transaction interface.
//!
//! ## Components
//!
//! - **Ledger**: owns oracle, risk, policy and claims state; applies one
//!   [`Transaction`] at a time and returns a [`Receipt`]
//! - **Sequencer**: tokio task draining a bounded queue into the ledger
//! - **Snapshot**: serializable state, BLAKE3 state root, JSON save/load
//! - **Config**: genesis registries and node settings
//! - **Feed**: JSON-lines transactions in, receipts out
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Ledger                               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐    ┌──────────┐    ┌──────────┐   ┌──────────┐ │
//! │  │  Oracle  │───▶│   Risk   │◀───│  Claims  │──▶│  Policy  │ │
//! │  └──────────┘    └──────────┘    └──────────┘   └──────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod feed;
pub mod ledger;
pub mod sequencer;
pub mod snapshot;
pub mod transaction;

pub use config::{GenesisConfig, NodeConfig};
pub use feed::feed;
pub use ledger::Ledger;
pub use sequencer::{LedgerHandle, SharedLedger};
pub use snapshot::{LedgerSnapshot, SnapshotFile};
pub use transaction::{Call, CallOutput, Component, Outcome, Receipt, Transaction};

/// Logical clock advance per write transaction when none is supplied
pub const DEFAULT_TICK: u64 = 1;

/// Default sequencer queue bound
pub const DEFAULT_QUEUE_DEPTH: usize = 1024;

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;
