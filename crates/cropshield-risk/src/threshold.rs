//! Event qualification thresholds

use serde::{Deserialize, Serialize};

use crate::event::{EventType, WeatherReading};

/// Bounds an observation must cross to count as a qualifying event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventThreshold {
    pub rainfall_min: u32,
    pub temperature_max: i32,
    /// 0 disables the wind condition
    pub wind_speed_min: u32,
}

impl EventThreshold {
    pub fn new(rainfall_min: u32, temperature_max: i32, wind_speed_min: u32) -> Self {
        Self {
            rainfall_min,
            temperature_max,
            wind_speed_min,
        }
    }

    /// Whether `reading` qualifies as `event` under these bounds.
    ///
    /// - drought: rainfall below `rainfall_min` and temperature above `temperature_max`
    /// - flood: rainfall at or above `rainfall_min`
    /// - frost: temperature at or below `temperature_max`
    ///
    /// A non-zero `wind_speed_min` additionally requires wind at or above it.
    pub fn is_crossed_by(&self, event: EventType, reading: &WeatherReading) -> bool {
        let crossed = match event {
            EventType::Drought => {
                reading.rainfall < self.rainfall_min
                    && reading.temperature > self.temperature_max
            }
            EventType::Flood => reading.rainfall >= self.rainfall_min,
            EventType::Frost => reading.temperature <= self.temperature_max,
        };

        crossed && (self.wind_speed_min == 0 || reading.wind_speed >= self.wind_speed_min)
    }
}
