//! Air Quality Index Calculation
//!
//! US EPA PM2.5 breakpoint formula: linear interpolation within the band
//! containing the concentration, rounded to the nearest integer. See the
//! EPA technical assistance document for the reporting of daily air
//! quality; results can be checked against the calculator at
//! <https://www.airnow.gov/aqi/aqi-calculator-concentration/>.

/// EPA PM2.5 breakpoints: (concentration low, high, AQI low, high).
///
/// Bands are listed ascending and selected by upper bound, so a value on
/// a shared edge resolves to the lower band and values inside the
/// documented 0.1 µg/m³ gaps between bands interpolate against the next
/// band rather than falling through.
const BREAKPOINTS: [(f64, f64, u16, u16); 7] = [
    (0.0, 12.0, 0, 50),
    (12.1, 35.4, 51, 100),
    (35.5, 55.4, 101, 150),
    (55.5, 150.4, 151, 200),
    (150.5, 250.4, 201, 300),
    (250.5, 350.4, 301, 400),
    (350.5, 500.4, 401, 500),
];

/// Calculate the AQI for a PM2.5 concentration in µg/m³.
///
/// Concentrations above the top band saturate to 500. Negative input is
/// undefined behaviour: the caller owns validation, this function does
/// not clamp.
pub fn calculate_aqi(pm25: f64) -> u16 {
    for (c_low, c_high, aqi_low, aqi_high) in BREAKPOINTS {
        if pm25 <= c_high {
            let span = f64::from(aqi_high - aqi_low) / (c_high - c_low);
            let aqi = span * (pm25 - c_low) + f64::from(aqi_low);
            return aqi.round() as u16;
        }
    }

    // PM2.5 > 500.4
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(calculate_aqi(0.0), 0);
        assert_eq!(calculate_aqi(12.0), 50);
        assert_eq!(calculate_aqi(12.1), 51);
        assert_eq!(calculate_aqi(35.4), 100);
        assert_eq!(calculate_aqi(55.4), 150);
        assert_eq!(calculate_aqi(500.4), 500);
    }

    #[test]
    fn saturates_above_the_table() {
        assert_eq!(calculate_aqi(600.0), 500);
        assert_eq!(calculate_aqi(500.5), 500);
    }

    #[test]
    fn interpolates_within_a_band() {
        // Spot values confirmed against the EPA calculator.
        assert_eq!(calculate_aqi(7.0), 29);
        assert_eq!(calculate_aqi(20.0), 68);
        assert_eq!(calculate_aqi(41.0), 115);
    }

    #[test]
    fn gap_values_do_not_fall_through() {
        // 12.05 sits between the published 12.0 and 12.1 edges; it must
        // land near the boundary, not saturate.
        let aqi = calculate_aqi(12.05);
        assert!((50..=51).contains(&aqi), "got {aqi}");
    }

    #[test]
    fn monotone_over_the_whole_range() {
        let mut last = 0;
        let mut c = 0.0;
        while c <= 510.0 {
            let aqi = calculate_aqi(c);
            assert!(aqi >= last, "AQI decreased at {c}");
            last = aqi;
            c += 0.25;
        }
    }
}
