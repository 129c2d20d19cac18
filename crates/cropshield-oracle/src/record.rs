//! Stored weather observation

use cropshield_risk::WeatherReading;
use serde::{Deserialize, Serialize};

/// Latest accepted observation for a (location, date) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location: String,
    /// Observation date (unix seconds)
    pub date: u64,
    #[serde(flatten)]
    pub reading: WeatherReading,
    /// Authorized source that submitted the reading
    pub data_source: String,
    /// Logical time of submission
    pub submitted_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_is_flattened() {
        let record = WeatherRecord {
            location: "Farm County, Region 3".to_string(),
            date: 1625000000,
            reading: WeatherReading {
                temperature: -5,
                rainfall: 150,
                humidity: 80,
                wind_speed: 25,
            },
            data_source: "National Weather Service".to_string(),
            submitted_at: 10,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["temperature"], -5);
        assert_eq!(value["wind_speed"], 25);

        let back: WeatherRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
