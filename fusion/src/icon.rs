//! Icon Selection and Priority
//!
//! Pure decision function combining weather condition, indoor CO₂,
//! particulates, lightning and time of day into one display icon. The
//! override order is safety-first and must hold exactly: storm and air
//! quality alerts always outrank cosmetic weather icons.

use pixelvane_telemetry::WeatherCondition;
use serde::{Deserialize, Serialize};

/// CO₂ level above which the ventilation icon takes over, in ppm.
pub const CO2_VENTILATION_PPM: f64 = 1000.0;

/// PM2.5 level above which the particulate alert icon takes over, in µg/m³.
pub const PM25_ALERT_UGM3: f64 = 55.0;

/// Icon identifiers for the display device's icon library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconSet {
    pub lightning: u32,
    pub particulate: u32,
    pub ventilation: u32,
    pub rain: u32,
    pub cloudy: u32,
    pub day_sun: u32,
    pub night: u32,
    pub snow: u32,
}

impl Default for IconSet {
    fn default() -> Self {
        Self {
            lightning: 130,
            particulate: 421,
            ventilation: 420,
            rain: 999,
            cloudy: 63,
            day_sun: 50,
            night: 60,
            snow: 777,
        }
    }
}

/// Night period: 17:00 through 05:59.
pub fn is_night(hour: u32) -> bool {
    hour >= 17 || hour < 6
}

/// Resolve the display icon.
///
/// Priority, highest first: active lightning, particulate alert,
/// ventilation, rain, cloudy, sunny (day or night variant), snow.
/// Returns `None` when nothing applies.
pub fn resolve_icon(
    condition: WeatherCondition,
    co2_ppm: Option<f64>,
    pm25: Option<f64>,
    lightning_active: bool,
    hour: u32,
    icons: &IconSet,
) -> Option<u32> {
    if lightning_active {
        return Some(icons.lightning);
    }

    if pm25.is_some_and(|pm| pm >= PM25_ALERT_UGM3) {
        return Some(icons.particulate);
    }

    if co2_ppm.is_some_and(|co2| co2 >= CO2_VENTILATION_PPM) {
        return Some(icons.ventilation);
    }

    match condition {
        WeatherCondition::Rain => Some(icons.rain),
        WeatherCondition::Cloudy => Some(icons.cloudy),
        WeatherCondition::Sunny if is_night(hour) => Some(icons.night),
        WeatherCondition::Sunny => Some(icons.day_sun),
        WeatherCondition::Snow => Some(icons.snow),
        WeatherCondition::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icons() -> IconSet {
        IconSet::default()
    }

    #[test]
    fn lightning_outranks_everything() {
        let icon = resolve_icon(
            WeatherCondition::Rain,
            Some(1500.0),
            Some(60.0),
            true,
            12,
            &icons(),
        );
        assert_eq!(icon, Some(130));
    }

    #[test]
    fn particulate_alert_outranks_weather_and_co2() {
        let icon = resolve_icon(
            WeatherCondition::Sunny,
            Some(1500.0),
            Some(60.0),
            false,
            12,
            &icons(),
        );
        assert_eq!(icon, Some(421));
    }

    #[test]
    fn ventilation_outranks_rain() {
        let icon = resolve_icon(WeatherCondition::Rain, Some(1200.0), None, false, 12, &icons());
        assert_eq!(icon, Some(420));
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(
            resolve_icon(WeatherCondition::Other, Some(1000.0), None, false, 12, &icons()),
            Some(420)
        );
        assert_eq!(
            resolve_icon(WeatherCondition::Other, None, Some(55.0), false, 12, &icons()),
            Some(421)
        );
        assert_eq!(
            resolve_icon(WeatherCondition::Other, Some(999.9), Some(54.9), false, 12, &icons()),
            None
        );
    }

    #[test]
    fn weather_icons_without_overrides() {
        assert_eq!(
            resolve_icon(WeatherCondition::Rain, Some(600.0), Some(10.0), false, 12, &icons()),
            Some(999)
        );
        assert_eq!(
            resolve_icon(WeatherCondition::Cloudy, None, None, false, 12, &icons()),
            Some(63)
        );
        assert_eq!(
            resolve_icon(WeatherCondition::Snow, None, None, false, 12, &icons()),
            Some(777)
        );
        assert_eq!(
            resolve_icon(WeatherCondition::Other, None, None, false, 12, &icons()),
            None
        );
    }

    #[test]
    fn sunny_day_and_night_boundaries() {
        let sunny = |hour| resolve_icon(WeatherCondition::Sunny, None, None, false, hour, &icons());
        assert_eq!(sunny(10), Some(50));
        assert_eq!(sunny(6), Some(50)); // day starts at 06:00 inclusive
        assert_eq!(sunny(16), Some(50));
        assert_eq!(sunny(17), Some(60)); // night starts at 17:00 inclusive
        assert_eq!(sunny(20), Some(60));
        assert_eq!(sunny(5), Some(60));
        assert_eq!(sunny(0), Some(60));
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let a = resolve_icon(WeatherCondition::Cloudy, Some(800.0), Some(20.0), false, 14, &icons());
        let b = resolve_icon(WeatherCondition::Cloudy, Some(800.0), Some(20.0), false, 14, &icons());
        assert_eq!(a, b);
    }
}
