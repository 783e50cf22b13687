//! Reverse geocoding through a Nominatim-compatible endpoint.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::geo::GeoPoint;
use crate::models::{LocationDescription, ReverseGeocodeResponse};

use super::client::{build_http_client, check_response, read_json};
use super::ApiError;

/// Nominatim zoom level 10 resolves to roughly city granularity.
const GEOCODE_ZOOM: &str = "10";

/// Turns a point into a display label. Implementations never fail: they
/// degrade to a coordinate label instead.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, point: GeoPoint) -> LocationDescription;
}

#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    url: String,
}

impl NominatimClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_http_client(&config.user_agent)?, config))
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.geocoder_url.clone(),
        }
    }

    /// Issue one reverse-geocode request. No retry.
    pub async fn reverse(&self, point: GeoPoint) -> Result<ReverseGeocodeResponse, ApiError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("zoom", GEOCODE_ZOOM.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;

        let response = check_response(response).await?;
        read_json(response).await
    }
}

#[async_trait]
impl LocationResolver for NominatimClient {
    async fn resolve(&self, point: GeoPoint) -> LocationDescription {
        match self.reverse(point).await {
            Ok(response) => {
                let description = LocationDescription::from_response(&response);
                debug!(lat = point.latitude, lng = point.longitude, %description, "Location resolved");
                description
            }
            Err(e) => {
                warn!(
                    error = %e,
                    lat = point.latitude,
                    lng = point.longitude,
                    "Error fetching location details, using coordinates"
                );
                LocationDescription::fallback(point)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{serve_once, CLOSED_PORT_URL};

    fn client_for(url: &str) -> NominatimClient {
        let config = Config {
            geocoder_url: url.to_string(),
            ..Config::default()
        };
        NominatimClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_uses_address() {
        let (base, request_rx) = serve_once(
            200,
            r#"{"display_name": "Oxford, England", "address": {"river": "Thames", "city": "Oxford"}}"#,
        )
        .await;

        let client = client_for(&format!("{}/reverse", base));
        let desc = client.resolve(GeoPoint::new(51.75, -1.25)).await;
        assert_eq!(desc.as_str(), "Thames, Oxford");

        let raw = request_rx.await.unwrap();
        let request_line = raw.lines().next().unwrap();
        assert!(request_line.starts_with("GET /reverse?format=json&lat=51.75&lon=-1.25&zoom=10&addressdetails=1"));
        assert!(raw.to_lowercase().contains("user-agent: oaracle/"));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_http_error() {
        let (base, _request_rx) = serve_once(503, "busy").await;

        let desc = client_for(&base).resolve(GeoPoint::new(53.408_44, -2.991_57)).await;
        assert_eq!(desc.as_str(), "Location at 53.4084, -2.9916");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_when_unreachable() {
        let point = GeoPoint::new(54.0, -2.0);
        let desc = client_for(CLOSED_PORT_URL).resolve(point).await;
        assert_eq!(desc, LocationDescription::fallback(point));
    }

    #[tokio::test]
    async fn test_reverse_surfaces_errors() {
        let (base, _request_rx) = serve_once(404, "no such endpoint").await;
        let err = client_for(&base).reverse(GeoPoint::new(0.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
