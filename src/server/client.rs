//! HTTP client for the school service

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Coordinate, NewSchool, School};

use super::api::{AddSchoolResponse, ErrorResponse, HealthResponse, SchoolsResponse};

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the school service client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL, without trailing slash
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Retry count for failed idempotent requests
    pub retry_count: u32,

    /// Retry delay
    pub retry_delay: Duration,
}

impl ClientConfig {
    /// Create a new client config
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
            retry_count: 3,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Build the base URL from `API_HOST` and `PORT`
    pub fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);
        Self::new(format!("http://{host}:{port}"))
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry count
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

// ============================================================================
// School Client
// ============================================================================

/// Client for the school service REST API
pub struct SchoolClient {
    config: ClientConfig,
    http_client: Client,
}

impl SchoolClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Schools sorted by distance from the given point
    pub async fn fetch_schools(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<School>, ClientError> {
        let url = format!("{}/schools", self.config.base_url);
        let response: SchoolsResponse = self
            .get_with_retry(|| {
                self.http_client
                    .get(&url)
                    .query(&[("latitude", latitude), ("longitude", longitude)])
            })
            .await?;

        Ok(response.schools)
    }

    /// Register a school and return its identifier
    ///
    /// Not retried, since a lost response could otherwise register twice.
    pub async fn add_school(&self, school: &NewSchool) -> Result<u64, ClientError> {
        let url = format!("{}/schools", self.config.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(school)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let body: AddSchoolResponse = decode(response).await?;
        Ok(body.school_id)
    }

    /// Resolve an address through the service's geocoder
    pub async fn geocode(&self, address: &str) -> Result<Coordinate, ClientError> {
        let url = format!("{}/geocode", self.config.base_url);
        self.get_with_retry(|| self.http_client.get(&url).query(&[("address", address)]))
            .await
    }

    /// Check service health
    pub async fn health_check(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.config.base_url);
        self.get_with_retry(|| self.http_client.get(&url)).await
    }

    // Internal: GET request with retry on network errors and 5xx
    async fn get_with_retry<T, F>(&self, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
            }

            let result = match build().send().await {
                Ok(response) => decode(response).await,
                Err(e) => Err(ClientError::Network(e.to_string())),
            };

            match result {
                Ok(data) => return Ok(data),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(attempt, error = %e, "Request failed, retrying");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::Network("Unknown error".to_string())))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()));
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    Err(ClientError::Http {
        status: status.as_u16(),
        message,
    })
}

// ============================================================================
// Client Errors
// ============================================================================

/// Client errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Network failures and server-side errors may succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Init(_) | Self::Parse(_) => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_creation() {
        let config = ClientConfig::new("http://localhost:3000/");

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.retry_count, 3);
    }

    #[test]
    fn test_client_config_builders() {
        let config = ClientConfig::new("http://localhost:3000")
            .with_timeout(Duration::from_secs(30))
            .with_retry_count(5)
            .with_retry_delay(Duration::from_millis(10));

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry_count, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(10));
    }

    #[test]
    fn test_client_creation() {
        let client = SchoolClient::new(ClientConfig::new("http://localhost:3000")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::Network("reset".to_string()).is_retryable());
        assert!(ClientError::Http {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::Http {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::Parse("bad json".to_string()).is_retryable());
    }
}
