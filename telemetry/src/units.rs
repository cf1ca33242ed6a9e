//! Provider Unit Conversion
//!
//! The Ecowitt API reports in US customary units; the display and the
//! fusion logic work in metric. Rounding matches what the display shows:
//! one decimal for temperature, wind and pressure, two for rain rate.

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    round1((f - 32.0) * 5.0 / 9.0)
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    round1(mph * 1.60934)
}

pub fn inches_to_mm(inches: f64) -> f64 {
    round2(inches * 25.4)
}

pub fn inhg_to_hpa(inhg: f64) -> f64 {
    round1(inhg * 33.8639)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_point() {
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
    }

    #[test]
    fn body_temperature() {
        assert_eq!(fahrenheit_to_celsius(98.6), 37.0);
    }

    #[test]
    fn one_inch_of_mercury() {
        let hpa = inhg_to_hpa(1.0);
        assert!((hpa - 33.8639).abs() < 0.01, "got {hpa}");
    }

    #[test]
    fn standard_pressure() {
        // 29.92 inHg is one standard atmosphere.
        let hpa = inhg_to_hpa(29.92);
        assert!((hpa - 1013.2).abs() < 0.1, "got {hpa}");
    }

    #[test]
    fn wind_speed() {
        assert_eq!(mph_to_kmh(10.0), 16.1);
        assert_eq!(mph_to_kmh(0.0), 0.0);
    }

    #[test]
    fn rain_rate_keeps_two_decimals() {
        assert_eq!(inches_to_mm(1.0), 25.4);
        assert_eq!(inches_to_mm(0.01), 0.25);
    }
}
