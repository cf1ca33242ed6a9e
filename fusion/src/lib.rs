//! Pixelvane Fusion Engine
//!
//! Fuses independently-updating environmental signals (outdoor weather,
//! weather condition, indoor air quality, particulates, lightning) into
//! one prioritized display state, republished on a fixed cadence.

pub mod aqi;
pub mod dedup;
pub mod engine;
pub mod icon;

use pixelvane_telemetry::TelemetryError;
use serde::{Deserialize, Serialize};

pub use dedup::LightningGate;
pub use engine::{format_ticker, EngineConfig, FusionEngine};
pub use icon::IconSet;

/// Particulate concentration paired with its derived index.
///
/// Both are absent until the first particulate message arrives; the AQI
/// is recomputed by the update loop on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    /// PM2.5 concentration in µg/m³
    pub pm25: f64,
    /// Air quality index in [0, 500]
    pub aqi: u16,
}

impl AirQualityReading {
    pub fn from_pm25(pm25: f64) -> Self {
        Self {
            pm25,
            aqi: aqi::calculate_aqi(pm25),
        }
    }
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

pub type Result<T> = std::result::Result<T, FusionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_quality_reading_derives_its_index() {
        let reading = AirQualityReading::from_pm25(20.0);
        assert_eq!(reading.pm25, 20.0);
        assert_eq!(reading.aqi, 68);
    }

    #[test]
    fn air_quality_reading_serializes_both_fields() {
        let json = serde_json::to_value(AirQualityReading::from_pm25(20.0)).unwrap();
        assert_eq!(json["pm25"], 20.0);
        assert_eq!(json["aqi"], 68);
    }
}
