//! Display rows for a conditions response.
//!
//! Fields missing from the response produce no row, and a section with no
//! rows is left out. Both the results panel and `--conditions` print from
//! this.

use std::collections::BTreeMap;

use oaracle_core::models::{ConditionsResult, ForecastEntry, Scalar};
use oaracle_core::utils::{format_date, format_measure, format_wind_direction};

/// Heading used when the response does not name the location.
pub const UNNAMED_LOCATION: &str = "Selected location";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub value: String,
}

impl Row {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub rows: Vec<Row>,
    /// Free text lines shown after the rows
    pub notes: Vec<String>,
}

impl Section {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            rows: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn push(&mut self, label: &str, value: Option<String>) {
        if let Some(value) = value {
            self.rows.push(Row::new(label, value));
        }
    }

    fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.notes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub heading: String,
    /// Score and category, shown next to the heading
    pub score: Option<String>,
    pub category: Option<String>,
    pub sections: Vec<Section>,
}

impl ResultsView {
    pub fn from_result(result: &ConditionsResult) -> Self {
        let heading = result
            .location_name()
            .unwrap_or(UNNAMED_LOCATION)
            .to_string();

        let rowability = result.rowability_score.as_ref();
        let score = rowability
            .and_then(|r| r.score.as_ref())
            .map(|s| format!("{}/10", s));
        let category = rowability.and_then(|r| r.category.as_ref()).map(|c| capitalize(c));

        let sections = [
            wind_section(result),
            weather_section(result),
            water_section(result),
            daylight_section(result),
            outlook_section(result),
            forecast_section(&result.forecast),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();

        Self {
            heading,
            score,
            category,
            sections,
        }
    }

    /// Plain text rendering for the terminal outside the TUI.
    pub fn to_text(&self) -> String {
        let mut out = self.heading.clone();
        match (&self.score, &self.category) {
            (Some(score), Some(category)) => out.push_str(&format!(" - {} ({})", score, category)),
            (Some(score), None) => out.push_str(&format!(" - {}", score)),
            (None, Some(category)) => out.push_str(&format!(" - {}", category)),
            (None, None) => {}
        }
        out.push('\n');

        let width = self
            .sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);

        for section in &self.sections {
            out.push_str(&format!("\n{}\n", section.title));
            for row in &section.rows {
                out.push_str(&format!("  {:<width$}  {}\n", row.label, row.value, width = width));
            }
            for note in &section.notes {
                out.push_str(&format!("  - {}\n", note));
            }
        }
        out
    }
}

fn measure(value: Option<&Scalar>, unit: &str) -> Option<String> {
    value.map(|v| format_measure(v, unit))
}

fn wind_section(result: &ConditionsResult) -> Section {
    let mut section = Section::new("Wind");
    if let Some(current) = &result.current_conditions {
        section.push("Speed", measure(current.wind_speed.as_ref(), "m/s"));
        section.push("Gusts", measure(current.wind_gust.as_ref(), "m/s"));
        section.push(
            "Direction",
            current.wind_direction.as_ref().map(format_wind_direction),
        );
    }
    section
}

fn weather_section(result: &ConditionsResult) -> Section {
    let mut section = Section::new("Weather");
    if let Some(current) = &result.current_conditions {
        section.push("Conditions", current.weather_description.clone());
        section.push("Temperature", measure(current.temperature.as_ref(), "°C"));
        section.push("Rain", measure(current.precipitation.as_ref(), "mm"));
        section.push("Humidity", measure(current.humidity.as_ref(), "%"));
        section.push("Pressure", measure(current.pressure.as_ref(), "hPa"));
        section.push("Visibility", measure(current.visibility.as_ref(), "km"));
    }
    section
}

fn water_section(result: &ConditionsResult) -> Section {
    let mut section = Section::new("Water");
    if let Some(water) = &result.water_conditions {
        section.push("Tide", measure(water.tide_state.as_ref(), ""));
        section.push("Next tide", measure(water.next_tide_time.as_ref(), ""));
        section.push("Tide type", water.tide_type.clone());
        section.push("Tide height", measure(water.tide_height.as_ref(), "m"));
        section.push("Level", measure(water.water_level.as_ref(), "m"));
        section.push("Flow", measure(water.flow_rate.as_ref(), "m³/s"));
        section.push("Temperature", measure(water.water_temperature.as_ref(), "°C"));
    }
    section
}

fn daylight_section(result: &ConditionsResult) -> Section {
    let mut section = Section::new("Daylight");
    if let Some(current) = &result.current_conditions {
        if let Some(sunrise) = &current.sunrise {
            section.notes.push(format!("Sunrise: {}", sunrise));
        }
        if let Some(sunset) = &current.sunset {
            section.notes.push(format!("Sunset: {}", sunset));
        }
    }
    section
}

fn outlook_section(result: &ConditionsResult) -> Section {
    let mut section = Section::new("Rowability");
    if let Some(score) = &result.rowability_score {
        for factor in &score.factors {
            let Some(description) = factor.description.clone().or_else(|| factor.factor.clone())
            else {
                continue;
            };
            let label = factor
                .impact
                .as_deref()
                .map(capitalize)
                .unwrap_or_else(|| "Factor".to_string());
            section.rows.push(Row::new(label, description));
        }
        section.notes.extend(score.recommendations.iter().cloned());
    }
    section
}

/// One row per day: temperature range, strongest wind and highest chance of
/// rain across that day's slots.
fn forecast_section(forecast: &[ForecastEntry]) -> Section {
    #[derive(Default)]
    struct Day {
        low: Option<f64>,
        high: Option<f64>,
        wind: Option<f64>,
        rain: Option<f64>,
    }

    fn lower(current: Option<f64>, next: Option<f64>) -> Option<f64> {
        match (current, next) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn higher(current: Option<f64>, next: Option<f64>) -> Option<f64> {
        match (current, next) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    let mut days: BTreeMap<&str, Day> = BTreeMap::new();
    for entry in forecast {
        let Some(date) = entry.date.as_deref() else {
            continue;
        };
        let day = days.entry(date).or_default();
        day.low = lower(day.low, entry.temperature_min.as_ref().and_then(Scalar::as_f64));
        day.high = higher(day.high, entry.temperature_max.as_ref().and_then(Scalar::as_f64));
        day.wind = higher(day.wind, entry.wind_speed.as_ref().and_then(Scalar::as_f64));
        day.rain = higher(
            day.rain,
            entry.precipitation_probability.as_ref().and_then(Scalar::as_f64),
        );
    }

    let mut section = Section::new("Forecast");
    for (date, day) in days {
        let mut parts = Vec::new();
        match (day.low, day.high) {
            (Some(low), Some(high)) => parts.push(format!(
                "{}-{} °C",
                Scalar::Number(low),
                Scalar::Number(high)
            )),
            (Some(t), None) | (None, Some(t)) => parts.push(format!("{} °C", Scalar::Number(t))),
            (None, None) => {}
        }
        if let Some(wind) = day.wind {
            parts.push(format!("wind {} m/s", Scalar::Number(wind)));
        }
        if let Some(rain) = day.rain {
            parts.push(format!("{}% rain", Scalar::Number(rain)));
        }
        if parts.is_empty() {
            continue;
        }
        section.rows.push(Row::new(format_date(date), parts.join(", ")));
    }
    section
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(value: serde_json::Value) -> ResultsView {
        ResultsView::from_result(&ConditionsResult::from_value(value))
    }

    #[test]
    fn test_only_location_name() {
        let v = view(json!({"location": {"name": "Henley Reach"}}));
        assert_eq!(v.heading, "Henley Reach");
        assert!(v.score.is_none());
        assert!(v.category.is_none());
        assert!(v.sections.is_empty());
    }

    #[test]
    fn test_unnamed_location() {
        let v = view(json!({"current_conditions": {"wind_speed": 3}}));
        assert_eq!(v.heading, UNNAMED_LOCATION);
        assert_eq!(v.sections.len(), 1);
        assert_eq!(v.sections[0].rows, vec![Row::new("Speed", "3 m/s")]);
    }

    #[test]
    fn test_full_response() {
        let v = view(json!({
            "location": {"name": "Thames near Oxford"},
            "current_conditions": {
                "wind_speed": 5.0,
                "wind_direction": 180,
                "temperature": 15.0,
                "weather_description": "Partly cloudy",
                "sunrise": "06:42",
                "sunset": "18:05"
            },
            "water_conditions": {"tide_state": "Rising", "next_tide_time": "14:20", "flow_rate": null},
            "rowability_score": {
                "score": 9,
                "category": "excellent",
                "factors": [{"factor": "wind_speed", "value": 5.0, "impact": "minor",
                             "description": "Moderate winds, manageable"}],
                "recommendations": ["Excellent conditions for rowing!"]
            }
        }));

        assert_eq!(v.heading, "Thames near Oxford");
        assert_eq!(v.score.as_deref(), Some("9/10"));
        assert_eq!(v.category.as_deref(), Some("Excellent"));

        let titles: Vec<_> = v.sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Wind", "Weather", "Water", "Daylight", "Rowability"]);

        let wind = &v.sections[0];
        assert_eq!(wind.rows[0], Row::new("Speed", "5 m/s"));
        assert_eq!(wind.rows[1], Row::new("Direction", "180° (S)"));

        let water = &v.sections[2];
        assert_eq!(water.rows.len(), 2);
        assert_eq!(water.rows[0], Row::new("Tide", "Rising"));

        let daylight = &v.sections[3];
        assert_eq!(daylight.notes, vec!["Sunrise: 06:42", "Sunset: 18:05"]);

        let outlook = &v.sections[4];
        assert_eq!(outlook.rows[0], Row::new("Minor", "Moderate winds, manageable"));
        assert_eq!(outlook.notes, vec!["Excellent conditions for rowing!"]);
    }

    #[test]
    fn test_forecast_grouped_by_day() {
        let v = view(json!({
            "forecast": [
                {"date": "2026-10-18", "time": "09:00", "temperature_min": 12, "temperature_max": 16,
                 "wind_speed": 5.0, "precipitation_probability": 20},
                {"date": "2026-10-18", "time": "15:00", "temperature_min": 13, "temperature_max": 18,
                 "wind_speed": 6.5, "precipitation_probability": 10},
                {"date": "2026-10-19", "time": "09:00", "wind_speed": 4},
                {"time": "12:00", "wind_speed": 40}
            ]
        }));

        let forecast = &v.sections[0];
        assert_eq!(forecast.title, "Forecast");
        assert_eq!(
            forecast.rows,
            vec![
                Row::new("Sun 18 Oct", "12-18 °C, wind 6.5 m/s, 20% rain"),
                Row::new("Mon 19 Oct", "wind 4 m/s"),
            ]
        );
    }

    #[test]
    fn test_to_text() {
        let v = view(json!({
            "location": {"name": "Dee"},
            "current_conditions": {"wind_speed": 2},
            "rowability_score": {"score": 8, "category": "excellent", "recommendations": ["Go"]}
        }));
        let text = v.to_text();
        assert!(text.starts_with("Dee - 8/10 (Excellent)\n"));
        assert!(text.contains("\nWind\n  Speed  2 m/s\n"));
        assert!(text.contains("\nRowability\n  - Go\n"));
    }
}
