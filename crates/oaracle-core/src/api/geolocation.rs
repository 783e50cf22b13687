//! One-shot device location via IP geolocation (ip-api.com JSON format).
//!
//! A terminal has no GPS, so "where am I" is answered from the public IP.
//! The answer is approximate (city level) but good enough to centre the map.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, info_span, Instrument};

use crate::config::Config;
use crate::geo::GeoPoint;

use super::client::{build_http_client, check_response, read_json};
use super::ApiError;

#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn locate(&self) -> Result<GeoPoint, ApiError>;
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

impl IpApiResponse {
    fn into_point(self) -> Result<GeoPoint, ApiError> {
        if self.status.as_deref() == Some("fail") {
            return Err(ApiError::InvalidResponse(format!(
                "Geolocation lookup failed: {}",
                self.message.unwrap_or_else(|| "unknown reason".to_string())
            )));
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let point = GeoPoint::new(lat, lon);
                if point.is_valid() {
                    info!(lat, lon, city = ?self.city, "Geolocation resolution successful");
                    Ok(point)
                } else {
                    Err(ApiError::InvalidResponse(format!(
                        "Geolocation returned out-of-range coordinates: {}",
                        point
                    )))
                }
            }
            _ => Err(ApiError::InvalidResponse(
                "Geolocation response missing coordinates".to_string(),
            )),
        }
    }
}

#[derive(Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_http_client(&config.user_agent)?, config))
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.geolocation_url.clone(),
        }
    }
}

#[async_trait]
impl DeviceLocator for IpLocator {
    async fn locate(&self) -> Result<GeoPoint, ApiError> {
        let span = info_span!("location.lookup", service = "ip-api");
        async move {
            let response = self.client.get(&self.url).send().await?;
            let response = check_response(response).await?;
            let parsed: IpApiResponse = read_json(response).await?;
            parsed.into_point()
        }
        .instrument(span)
        .await
    }
}
