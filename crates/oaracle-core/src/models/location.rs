use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Shown when the geocoder answers but gives us nothing to work with.
const UNKNOWN_LOCATION: &str = "Unknown location";

/// Reverse-geocode response from Nominatim. Only the fields we display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub waterway: Option<String>,
    #[serde(default)]
    pub river: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
}

/// Human-readable label for a selected point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationDescription(String);

impl LocationDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Label used when the geocoder could not be reached.
    pub fn fallback(point: GeoPoint) -> Self {
        Self(format!(
            "Location at {:.4}, {:.4}",
            point.latitude, point.longitude
        ))
    }

    /// Build a label from a geocode response.
    ///
    /// Water features come first (waterway, then river), followed by the
    /// first settlement found among city, town and village. When the address
    /// yields nothing the provider's full display name is used.
    pub fn from_response(response: &ReverseGeocodeResponse) -> Self {
        if let Some(ref address) = response.address {
            let parts = address.label_parts();
            if !parts.is_empty() {
                return Self(parts.join(", "));
            }
        }

        let text = response
            .display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_LOCATION);
        Self(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Address {
    fn label_parts(&self) -> Vec<&str> {
        let mut parts = Vec::new();
        if let Some(waterway) = non_empty(&self.waterway) {
            parts.push(waterway);
        }
        if let Some(river) = non_empty(&self.river) {
            parts.push(river);
        }
        let settlement = non_empty(&self.city)
            .or_else(|| non_empty(&self.town))
            .or_else(|| non_empty(&self.village));
        if let Some(settlement) = settlement {
            parts.push(settlement);
        }
        parts
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
