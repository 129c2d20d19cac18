//! # Risk Assessment
//!
//! Event qualification thresholds, per-location/crop risk profiles and the
//! per-location history of qualifying weather events.
//!
//! ## Risk factor
//!
//! ```text
//! risk = max(0, base * climate / 100 + (loss - 10) - (soil - 80))
//! ```
//!
//! Where:
//! - base, climate: percentage-scaled base risk and climate multiplier
//! - loss: historical loss percentage, 10 is the neutral baseline
//! - soil: soil quality score, 80 is the neutral baseline

pub mod assessment;
pub mod event;
pub mod history;
pub mod profile;
pub mod threshold;

pub use assessment::RiskAssessment;
pub use event::{EventType, ParseEventTypeError, WeatherReading};
pub use history::LocationEventHistory;
pub use profile::{RiskFactors, RiskProfile};
pub use threshold::EventThreshold;
