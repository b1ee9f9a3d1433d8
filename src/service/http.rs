use crate::config::FinderConfig;
use crate::error::SearchError;
use crate::models::{ParkingSpot, SearchCriteria, SearchResponse};
use crate::service::traits::ParkingService;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("parking-finder/", env!("CARGO_PKG_VERSION"));

/// Parking service reached with a JSON POST
pub struct HttpParkingService {
    client: Client,
    endpoint: String,
}

impl HttpParkingService {
    /// Create a service for `endpoint` with no request timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::build(endpoint.into(), None)
    }

    /// Create a service from loaded configuration
    pub fn from_config(config: &FinderConfig) -> Result<Self> {
        Self::build(config.endpoint.clone(), config.timeout)
    }

    fn build(endpoint: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ParkingService for HttpParkingService {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ParkingSpot>, SearchError> {
        debug!("POST {} {:?}", self.endpoint, criteria);

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(criteria)
            .send()
            .await
            .map_err(SearchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Parking service returned status: {}", status);
            return Err(SearchError::Status(status));
        }

        let body = response.bytes().await.map_err(SearchError::Transport)?;
        debug!("Received {} bytes from parking service", body.len());

        let parsed: SearchResponse =
            serde_json::from_slice(&body).map_err(SearchError::Decode)?;
        let spots = parsed.into_spots();

        info!("Parking service returned {} spots", spots.len());
        Ok(spots)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
