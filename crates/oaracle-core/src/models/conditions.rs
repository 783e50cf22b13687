//! Request and response types for the rowing conditions backend.
//!
//! The backend payload is treated as opaque: every field is optional, and a
//! field whose JSON type does not match what we expect is read as absent
//! instead of failing the whole response.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::GeoPoint;

/// Flags sent with every conditions request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionsOptions {
    pub include_weather: bool,
    pub include_water: bool,
    pub include_forecast: bool,
    pub days_ahead: u8,
}

impl ConditionsOptions {
    /// Weather, water and a full week of forecast.
    pub const STANDARD: Self = Self {
        include_weather: true,
        include_water: true,
        include_forecast: true,
        days_ahead: 7,
    };
}

impl Default for ConditionsOptions {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Body of `POST /api/conditions/`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionsRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub options: ConditionsOptions,
}

impl ConditionsRequest {
    pub fn for_point(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            options: ConditionsOptions::STANDARD,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A JSON scalar that may arrive as either a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Flag(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers print without a trailing ".0"
            Scalar::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Flag(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionsResult {
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<LocationInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_conditions: Option<CurrentConditions>,
    #[serde(default, deserialize_with = "lenient")]
    pub water_conditions: Option<WaterConditions>,
    #[serde(default, deserialize_with = "lenient")]
    pub rowability_score: Option<RowabilityScore>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub forecast: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub waterway_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub nearest_town: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, deserialize_with = "lenient")]
    pub wind_speed: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_gust: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_direction: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub precipitation: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub pressure: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub visibility: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather_description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunrise: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunset: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterConditions {
    #[serde(default, deserialize_with = "lenient")]
    pub tide_state: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub next_tide_time: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub tide_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tide_height: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub water_level: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub flow_rate: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub water_temperature: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowabilityScore {
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub factors: Vec<ScoreFactor>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub recommendations: Vec<String>,
}

/// One input that moved the rowability score up or down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    #[serde(default, deserialize_with = "lenient")]
    pub factor: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub impact: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_min: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_max: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_speed: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_gust: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_direction: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub precipitation_probability: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather_description: Option<String>,
}

/// Response of `GET /api/health/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("healthy")
    }
}

impl ConditionsResult {
    /// Parse an arbitrary JSON document. Never fails: a document that is not
    /// an object simply has no fields.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.name.as_deref())
    }
}

/// Deserialize an optional field, reading any shape mismatch as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize a list, keeping only the elements that parse.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
