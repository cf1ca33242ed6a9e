//! Pixelvane Telemetry Layer
//!
//! Provides the collaborator seams between the fusion engine and the
//! outside world: weather APIs, MQTT sensor transports and the AWTRIX
//! display device.
//!
//! # Modules
//!
//! - [`cell`] - Thread-safe single-value cells for asynchronously updated sensor streams
//! - [`units`] - Conversion from Ecowitt provider units (F, mph, in, inHg) to metric
//! - [`condition`] - Weather-code classification table (Sunny / Cloudy / Rain / Snow)
//! - [`ecowitt`] - Outdoor telemetry over the Ecowitt real-time HTTP API
//! - [`open_meteo`] - Weather condition over the Open-Meteo HTTP API
//! - [`mqtt`] - MQTT listeners, the bounded-wait indoor sampler and the AWTRIX client
//!
//! # Example
//!
//! ```rust,no_run
//! use pixelvane_telemetry::cell::SensorCell;
//! use std::sync::Arc;
//!
//! let pm25: Arc<SensorCell<f64>> = Arc::new(SensorCell::new());
//! pm25.set(18.2);
//! assert_eq!(pm25.get(), Some(18.2));
//! ```

use serde::{Deserialize, Serialize};
use std::future::Future;

pub mod cell;
pub mod condition;
pub mod ecowitt;
pub mod mqtt;
pub mod open_meteo;
pub mod units;

// Re-exports for convenience
pub use cell::{SensorCell, Stamped};
pub use condition::{ConditionMap, ConditionRule, WeatherCondition};
pub use ecowitt::EcowittSource;
pub use mqtt::{AwtrixClient, MqttIndoorSampler, MqttSettings};
pub use open_meteo::OpenMeteoSource;

/// Telemetry error types
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    #[error("MQTT connection error: {0}")]
    MqttConnection(#[from] rumqttc::ConnectionError),

    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Unparseable value for {field}: {raw}")]
    BadValue { field: String, raw: String },
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Outdoor weather telemetry in metric units.
///
/// Derived from a provider-native reading via [`units`]; substituted with
/// [`OutdoorTelemetry::SENTINEL`] by the update loop when the source fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutdoorTelemetry {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_kmh: f64,
    pub rain_mm: f64,
    pub uv_index: f64,
    pub pressure_hpa: f64,
}

impl OutdoorTelemetry {
    /// Fallback tuple shown when live telemetry cannot be obtained.
    pub const SENTINEL: OutdoorTelemetry = OutdoorTelemetry {
        temperature_c: -3.0,
        humidity_pct: 99,
        wind_kmh: 2.0,
        rain_mm: 0.0,
        uv_index: 0.0,
        pressure_hpa: 1000.0,
    };
}

/// Indoor CO₂ / temperature / humidity sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndoorReading {
    pub co2_ppm: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

/// One custom-app frame for the display device.
///
/// Field names follow the AWTRIX custom-app JSON schema on the wire.
/// `unique` must differ on every publish so the firmware refreshes even
/// when the text is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPayload {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<u32>,
    pub color: [u8; 3],
    #[serde(rename = "scrollSpeed")]
    pub scroll_speed: u32,
    pub repeat: u32,
    pub unique: String,
}

/// One-off alert for the display device's notify channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub text: String,
    pub duration: u32,
    pub icon: u32,
    pub color: [u8; 3],
    pub repeat: u32,
}

/// Request/response source for outdoor telemetry.
pub trait OutdoorSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<OutdoorTelemetry>> + Send;
}

/// Request/response source for the categorical weather condition.
pub trait ConditionSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<WeatherCondition>> + Send;
}

/// Best-effort bounded-wait sampler for the indoor air quality stream.
///
/// `sample` waits up to a fixed short window for one message and then
/// returns whatever arrived, if anything. Absence is not an error.
pub trait IndoorSource: Send + Sync {
    fn sample(&self) -> impl Future<Output = Result<Option<IndoorReading>>> + Send;
}

/// Sink for display frames.
pub trait DisplaySink: Send + Sync {
    fn publish(&self, payload: &DisplayPayload) -> impl Future<Output = Result<()>> + Send;
}

/// Sink for push notifications.
pub trait AlertSink: Send + Sync {
    fn notify(&self, notification: &Notification) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_matches_documented_fallback() {
        let s = OutdoorTelemetry::SENTINEL;
        assert_eq!(s.temperature_c, -3.0);
        assert_eq!(s.humidity_pct, 99);
        assert_eq!(s.wind_kmh, 2.0);
        assert_eq!(s.rain_mm, 0.0);
        assert_eq!(s.uv_index, 0.0);
        assert_eq!(s.pressure_hpa, 1000.0);
    }

    #[test]
    fn display_payload_uses_awtrix_field_names() {
        let payload = DisplayPayload {
            id: "weather".to_string(),
            text: "hello".to_string(),
            icon: Some(63),
            color: [255, 200, 100],
            scroll_speed: 40,
            repeat: 1,
            unique: "1-0".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["scrollSpeed"], 40);
        assert_eq!(json["unique"], "1-0");
        assert_eq!(json["icon"], 63);
    }

    #[test]
    fn absent_icon_is_omitted_from_the_wire() {
        let payload = DisplayPayload {
            id: "weather".to_string(),
            text: "hello".to_string(),
            icon: None,
            color: [255, 200, 100],
            scroll_speed: 40,
            repeat: 1,
            unique: "1-1".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("icon").is_none());
    }
}
