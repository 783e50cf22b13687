//! API client for the rowing conditions backend.
//!
//! This module provides the `ApiClient` struct for requesting conditions at
//! a point and checking backend health, plus the response helpers shared by
//! the geocoding and geolocation clients.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::models::{ConditionsRequest, ConditionsResult, HealthStatus};

use super::ApiError;

/// Anything that can answer a conditions request. The app context holds one
/// of these so tests can swap in a double.
#[async_trait]
pub trait ConditionsSource: Send + Sync {
    async fn fetch_conditions(
        &self,
        request: &ConditionsRequest,
    ) -> Result<ConditionsResult, ApiError>;
}

/// Build the shared HTTP client. No timeout is configured; requests rely on
/// the platform defaults.
pub fn build_http_client(user_agent: &str) -> Result<Client, ApiError> {
    Ok(Client::builder().user_agent(user_agent).build()?)
}

/// Check if response is successful, returning an error with body if not.
pub(crate) async fn check_response(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}

/// Read a successful response body as JSON of the given type.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| ApiError::InvalidResponse(format!("Response was not valid JSON: {}", e)))
}

/// API client for the conditions backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    conditions_url: String,
    health_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_http_client(&config.user_agent)?, config))
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            conditions_url: config.api_url("conditions/"),
            health_url: config.api_url("health/"),
        }
    }

    /// POST the request once. Any 2xx with a JSON body counts as success;
    /// the body is not checked against a schema.
    pub async fn fetch_conditions(
        &self,
        request: &ConditionsRequest,
    ) -> Result<ConditionsResult, ApiError> {
        info!(
            url = %self.conditions_url,
            lat = request.latitude,
            lng = request.longitude,
            "Requesting rowing conditions"
        );

        let response = self
            .client
            .post(&self.conditions_url)
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Conditions request failed to send");
                ApiError::from(e)
            })?;

        debug!(status = %response.status(), "Conditions response received");

        let response = match check_response(response).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Conditions request rejected");
                return Err(e);
            }
        };

        let body: serde_json::Value = read_json(response).await?;
        Ok(ConditionsResult::from_value(body))
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.client.get(&self.health_url).send().await?;
        let response = check_response(response).await?;
        read_json(response).await
    }
}

#[async_trait]
impl ConditionsSource for ApiClient {
    async fn fetch_conditions(
        &self,
        request: &ConditionsRequest,
    ) -> Result<ConditionsResult, ApiError> {
        ApiClient::fetch_conditions(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{serve_once, CLOSED_PORT_URL};
    use crate::geo::GeoPoint;

    fn client_for(base_url: &str) -> ApiClient {
        let config = Config {
            api_base_url: base_url.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_conditions_success() {
        let (base, request_rx) = serve_once(
            200,
            r#"{"location": {"name": "Thames near Oxford"}, "rowability_score": {"score": 8, "category": "excellent"}}"#,
        )
        .await;

        let request = ConditionsRequest::for_point(GeoPoint::new(51.75, -1.25));
        let result = client_for(&base).fetch_conditions(&request).await.unwrap();
        assert_eq!(result.location_name(), Some("Thames near Oxford"));

        let raw = request_rx.await.unwrap();
        assert!(raw.starts_with("POST /api/conditions/ HTTP/1.1"));
        assert!(raw.contains("\"days_ahead\":7"));
        assert!(raw.contains("\"include_forecast\":true"));
    }

    #[tokio::test]
    async fn test_fetch_conditions_server_error() {
        let (base, _request_rx) = serve_once(500, "Internal Server Error").await;

        let request = ConditionsRequest::for_point(GeoPoint::new(51.75, -1.25));
        let err = client_for(&base).fetch_conditions(&request).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_fetch_conditions_not_json() {
        let (base, _request_rx) = serve_once(200, "<html>gateway</html>").await;

        let request = ConditionsRequest::for_point(GeoPoint::new(0.0, 0.0));
        let err = client_for(&base).fetch_conditions(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_conditions_unreachable() {
        let request = ConditionsRequest::for_point(GeoPoint::new(0.0, 0.0));
        let err = client_for(CLOSED_PORT_URL).fetch_conditions(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_health() {
        let (base, request_rx) = serve_once(
            200,
            r#"{"status": "healthy", "timestamp": "2026-10-18T09:00:00Z", "service": "Oaracle Conditions API"}"#,
        )
        .await;

        let health = client_for(&base).health().await.unwrap();
        assert!(health.is_healthy());
        assert!(request_rx.await.unwrap().starts_with("GET /api/health/ HTTP/1.1"));
    }
}
