//! # Weather Oracle
//!
//! Ingests weather observations from authorized data sources and keeps one
//! record per (location, date). Every accepted observation is checked against
//! the registered event thresholds; qualifying events are pushed into the
//! risk assessment's location history on the same write path.

pub mod oracle;
pub mod record;

pub use oracle::WeatherOracle;
pub use record::WeatherRecord;
