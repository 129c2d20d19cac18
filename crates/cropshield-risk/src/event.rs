//! Weather event types and raw readings

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Insured weather perils
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Drought,
    Flood,
    Frost,
}

impl EventType {
    pub const ALL: [EventType; 3] = [EventType::Drought, EventType::Flood, EventType::Frost];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Drought => "drought",
            EventType::Flood => "flood",
            EventType::Frost => "frost",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type: {0}")]
pub struct ParseEventTypeError(pub String);

impl std::str::FromStr for EventType {
    type Err = ParseEventTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drought" => Ok(EventType::Drought),
            "flood" => Ok(EventType::Flood),
            "frost" => Ok(EventType::Frost),
            other => Err(ParseEventTypeError(other.to_string())),
        }
    }
}

/// One weather observation for a location and date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Degrees Celsius
    pub temperature: i32,
    /// Millimetres
    pub rainfall: u32,
    /// Relative humidity, percent
    pub humidity: u32,
    /// km/h
    pub wind_speed: u32,
}
