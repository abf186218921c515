//! Prediction API client.
//!
//! Provides async HTTP access to the cyclone impact prediction service.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::errors::PredictError;
use crate::models::{PredictRequest, PredictionSet};

/// Default request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("cyclone-impact/", env!("CARGO_PKG_VERSION"));

/// Default prediction endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/predict";

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the predict endpoint
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Client for the prediction API.
#[derive(Debug, Clone)]
pub struct PredictClient {
    client: Client,
    endpoint: String,
}

impl PredictClient {
    /// Create a new prediction client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, PredictError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request impact predictions for one cyclone position.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or a body
    /// that is not a list of prediction records.
    #[instrument(skip(self), fields(lat = %request.lat, lon = %request.lon))]
    pub async fn predict(&self, request: &PredictRequest) -> Result<PredictionSet, PredictError> {
        debug!("posting prediction request to {}", self.endpoint);

        let response = self.client.post(&self.endpoint).json(request).send().await?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = response.bytes().await?;
        let predictions: PredictionSet = serde_json::from_slice(&bytes)?;

        predictions.validate()?;

        debug!("received {} locality predictions", predictions.len());
        Ok(predictions)
    }
}
