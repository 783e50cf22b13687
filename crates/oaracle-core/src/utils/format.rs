use chrono::NaiveDate;

use crate::models::Scalar;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Value followed by a unit, e.g. "5 m/s"
pub fn format_measure(value: &Scalar, unit: &str) -> String {
    if unit.is_empty() {
        value.to_string()
    } else {
        format!("{} {}", value, unit)
    }
}

/// Wind direction for display. Numeric bearings get a compass point,
/// anything else is shown as sent.
pub fn format_wind_direction(value: &Scalar) -> String {
    match value.as_f64() {
        Some(degrees) if degrees.is_finite() => {
            format!("{}° ({})", value, compass_point(degrees))
        }
        _ => value.to_string(),
    }
}

/// 16-point compass name for a bearing in degrees
pub fn compass_point(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Format a forecast date like "Sun 18 Oct"; unparseable input is returned as-is
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%a %d %b").to_string(),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Tŵr Aber", 5), "Tŵ...");
    }

    #[test]
    fn test_compass_point() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(180.0), "S");
        assert_eq!(compass_point(225.0), "SW");
        assert_eq!(compass_point(350.0), "N");
        assert_eq!(compass_point(-90.0), "W");
    }

    #[test]
    fn test_format_wind_direction() {
        assert_eq!(format_wind_direction(&Scalar::Number(180.0)), "180° (S)");
        assert_eq!(format_wind_direction(&Scalar::Text("NE".to_string())), "NE");
    }

    #[test]
    fn test_format_measure() {
        assert_eq!(format_measure(&Scalar::Number(5.0), "m/s"), "5 m/s");
        assert_eq!(format_measure(&Scalar::Number(12.5), "°C"), "12.5 °C");
        assert_eq!(format_measure(&Scalar::Text("calm".to_string()), ""), "calm");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-10-18"), "Sun 18 Oct");
        assert_eq!(format_date("tomorrow"), "tomorrow");
    }
}
