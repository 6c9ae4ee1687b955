//! API client for communicating with the hosted holdings service.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::error::{RemoteApiError, Result};
use crate::types::*;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the holdings cloud API.
///
/// One failed attempt is final at this layer: there is no retry or backoff,
/// the caller decides what a failure means.
#[derive(Debug, Clone)]
pub struct HoldingsApiClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl HoldingsApiClient {
    /// Create a new holdings API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the service (e.g., "https://api.ingot.app")
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Attach a bearer token sent with every request.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Create headers for an API request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.access_token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteApiError::auth("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(RemoteApiError::api(
                    status.as_u16(),
                    format!("{}: {}", error.code, error.message),
                ));
            }
            return Err(RemoteApiError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            RemoteApiError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Holdings
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch all holdings rows for a user, tombstoned rows included.
    ///
    /// Rows are returned as raw JSON values so the repository can decode
    /// each one defensively instead of failing the whole read.
    ///
    /// GET /api/v1/holdings?user_id={userId}
    pub async fn fetch_holdings(&self, user_id: &str) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/api/v1/holdings", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("user_id", user_id)])
            .headers(self.headers()?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Create a holding.
    ///
    /// POST /api/v1/holdings
    pub async fn create_holding(&self, payload: &HoldingPayload) -> Result<HoldingRecord> {
        let url = format!("{}/api/v1/holdings", self.base_url);
        debug!("Creating remote holding: {:?}", payload);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Update a holding.
    ///
    /// PATCH /api/v1/holdings/{id}
    pub async fn patch_holding(&self, id: &str, payload: &HoldingPayload) -> Result<HoldingRecord> {
        let url = format!("{}/api/v1/holdings/{}", self.base_url, id);
        debug!("Patching remote holding {}", id);

        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Write the tombstone that soft-deletes a holding.
    ///
    /// PATCH /api/v1/holdings/{id}
    pub async fn tombstone_holding(&self, id: &str, payload: &TombstonePayload) -> Result<()> {
        let url = format!("{}/api/v1/holdings/{}", self.base_url, id);
        debug!("Tombstoning remote holding {}", id);

        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .json(payload)
            .send()
            .await?;

        // The response body echoes the record; only the status matters here.
        let _: serde_json::Value = Self::parse_response(response).await?;
        Ok(())
    }

    /// Bulk-insert previously local-only holdings.
    ///
    /// POST /api/v1/holdings/migrate
    pub async fn migrate_holdings(&self, request: &MigrateRequest) -> Result<Vec<HoldingRecord>> {
        let url = format!("{}/api/v1/holdings/migrate", self.base_url);
        debug!("Migrating {} holdings", request.holdings.len());

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
