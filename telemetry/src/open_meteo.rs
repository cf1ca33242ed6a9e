//! Open-Meteo Condition Source
//!
//! Fetches the current weather code for a fixed location and classifies
//! it through the configured [`ConditionMap`]. No API key required.

use crate::{ConditionMap, ConditionSource, Result, TelemetryError, WeatherCondition};
use serde_json::Value;

const API_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Weather condition over the Open-Meteo forecast API.
pub struct OpenMeteoSource {
    client: reqwest::Client,
    latitude: f64,
    longitude: f64,
    map: ConditionMap,
}

impl OpenMeteoSource {
    pub fn new(latitude: f64, longitude: f64, map: ConditionMap) -> Self {
        Self {
            client: reqwest::Client::new(),
            latitude,
            longitude,
            map,
        }
    }
}

impl ConditionSource for OpenMeteoSource {
    async fn fetch(&self) -> Result<WeatherCondition> {
        let body: Value = self
            .client
            .get(API_URL)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let code = extract_code(&body)?;
        Ok(self.map.classify(code))
    }
}

fn extract_code(body: &Value) -> Result<u16> {
    let pointer = "/current_weather/weathercode";
    let node = body
        .pointer(pointer)
        .ok_or_else(|| TelemetryError::MissingField(pointer.to_string()))?;

    node.as_f64()
        .map(|c| c as u16)
        .ok_or_else(|| TelemetryError::BadValue {
            field: pointer.to_string(),
            raw: node.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_the_current_weather_code() {
        let body = json!({
            "latitude": 45.3,
            "current_weather": { "temperature": 4.2, "weathercode": 61 }
        });
        assert_eq!(extract_code(&body).unwrap(), 61);
    }

    #[test]
    fn missing_block_is_an_error() {
        let body = json!({ "latitude": 45.3 });
        assert!(matches!(
            extract_code(&body).unwrap_err(),
            TelemetryError::MissingField(_)
        ));
    }

    #[test]
    fn non_numeric_code_is_an_error() {
        let body = json!({ "current_weather": { "weathercode": "drizzle" } });
        assert!(matches!(
            extract_code(&body).unwrap_err(),
            TelemetryError::BadValue { .. }
        ));
    }
}
