//! Ecowitt Outdoor Telemetry Source
//!
//! Fetches the station's real-time reading over the Ecowitt v3 HTTP API
//! and converts it to metric. The API nests every measurement under a
//! `value` key and reports numbers as strings, so parsing goes through
//! [`serde_json::Value`] pointers rather than a rigid struct.

use crate::{units, OutdoorSource, OutdoorTelemetry, Result, TelemetryError};
use serde_json::Value;

const API_URL: &str = "https://api.ecowitt.net/api/v3/device/real_time";

/// Outdoor telemetry over the Ecowitt real-time API.
pub struct EcowittSource {
    client: reqwest::Client,
    application_key: String,
    api_key: String,
    mac: String,
}

impl EcowittSource {
    pub fn new(application_key: &str, api_key: &str, mac: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            application_key: application_key.to_string(),
            api_key: api_key.to_string(),
            mac: mac.to_string(),
        }
    }
}

impl OutdoorSource for EcowittSource {
    async fn fetch(&self) -> Result<OutdoorTelemetry> {
        let body: Value = self
            .client
            .get(API_URL)
            .query(&[
                ("application_key", self.application_key.as_str()),
                ("api_key", self.api_key.as_str()),
                ("mac", self.mac.as_str()),
                ("call_back", "all"),
            ])
            .send()
            .await?
            .json()
            .await?;

        parse_outdoor(&body)
    }
}

/// Extract and convert the outdoor reading from an API response.
pub fn parse_outdoor(api: &Value) -> Result<OutdoorTelemetry> {
    let temp_f = field_f64(api, "/data/outdoor/temperature/value")?;
    let humidity = field_f64(api, "/data/outdoor/humidity/value")?;
    let wind_mph = field_f64(api, "/data/wind/wind_speed/value")?;
    let rain_in = field_f64(api, "/data/rainfall/rain_rate/value")?;
    let uv = field_f64(api, "/data/solar_and_uvi/uvi/value")?;
    let pressure_inhg = field_f64(api, "/data/pressure/relative/value")?;

    Ok(OutdoorTelemetry {
        temperature_c: units::fahrenheit_to_celsius(temp_f),
        humidity_pct: humidity.clamp(0.0, 100.0) as u8,
        wind_kmh: units::mph_to_kmh(wind_mph),
        rain_mm: units::inches_to_mm(rain_in),
        uv_index: uv,
        pressure_hpa: units::inhg_to_hpa(pressure_inhg),
    })
}

/// Read a numeric field that the API may encode as a string or a number.
fn field_f64(api: &Value, pointer: &str) -> Result<f64> {
    let node = api
        .pointer(pointer)
        .ok_or_else(|| TelemetryError::MissingField(pointer.to_string()))?;

    match node {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| TelemetryError::BadValue {
                field: pointer.to_string(),
                raw: n.to_string(),
            }),
        Value::String(s) => s.trim().parse().map_err(|_| TelemetryError::BadValue {
            field: pointer.to_string(),
            raw: s.clone(),
        }),
        other => Err(TelemetryError::BadValue {
            field: pointer.to_string(),
            raw: other.to_string(),
        }),
    }
}
