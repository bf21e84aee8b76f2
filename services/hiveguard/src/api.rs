//! Typed client for the beehive backend API

use std::sync::Arc;

use crate::io::HttpClient;
use crate::reading::{GasReading, Prediction, WeightReading};

/// Client for the beehive backend HTTP API
///
/// All non-2xx responses are failures; malformed payloads surface as parse
/// errors. Neither is retried here, the poller retries on its own cadence.
pub struct BackendClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BackendClient {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Fetch the `n` most recent gas readings, newest first
    pub async fn latest_gas(&self, n: usize) -> crate::Result<Vec<GasReading>> {
        let url = format!("{}/api/gas/last/{}", self.base_url, n);
        let body = self.fetch(&url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the `n` most recent weight readings, newest first
    pub async fn latest_weight(&self, n: usize) -> crate::Result<Vec<WeightReading>> {
        let url = format!("{}/api/weight/last/{}", self.base_url, n);
        let body = self.fetch(&url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the current leak prediction
    pub async fn prediction(&self) -> crate::Result<Prediction> {
        let url = format!("{}/api/gas/predict", self.base_url);
        let body = self.fetch(&url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch(&self, url: &str) -> crate::Result<String> {
        let response = self.http.get(url).await?;
        if !(200..300).contains(&response.status) {
            return Err(crate::HiveGuardError::Api(format!(
                "GET {} returned status {}",
                url, response.status
            )));
        }
        Ok(response.body)
    }
}
