//! External regional source
//!
//! The system of record publishes the complete current list of regionals at
//! `GET {base_url}/v1/regionais`. There is no pagination: one call returns
//! everything.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RegionalRecord;

const REGIONALS_PATH: &str = "/v1/regionais";
const USER_AGENT: &str = concat!("discography-regional/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetch failures
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Provides the complete current set of regionals
#[async_trait]
pub trait RegionalSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<RegionalRecord>, SourceError>;
}

/// HTTP client for the regional system of record
pub struct HttpRegionalSource {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpRegionalSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: regionals_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn regionals_endpoint(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), REGIONALS_PATH)
}

#[async_trait]
impl RegionalSource for HttpRegionalSource {
    async fn fetch_all(&self) -> Result<Vec<RegionalRecord>, SourceError> {
        tracing::debug!(endpoint = %self.endpoint, "Fetching regionals");

        let response = self
            .http_client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), error_text));
        }

        let records: Vec<RegionalRecord> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        tracing::debug!(count = records.len(), "Fetched regionals");
        Ok(records)
    }
}
