//! Client for the third-party current-weather API.

use std::time::Duration;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Upper bound on a single upstream call.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper around `reqwest` that knows the API key and default city.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, config }
    }

    /// Fetch current conditions for `city` and return the upstream JSON as is.
    pub async fn current(&self, city: Option<&str>) -> AppResult<serde_json::Value> {
        let city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.config.default_city);

        let response = self
            .http
            .get(&self.config.api_url)
            .query(&[("key", self.config.api_key.as_str()), ("q", city), ("aqi", "no")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, city, "Weather request failed");
                upstream_failure()
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, city, "Weather service returned an error status");
            return Err(upstream_failure());
        }

        response.json::<serde_json::Value>().await.map_err(|e| {
            tracing::warn!(error = %e, city, "Weather response was not JSON");
            upstream_failure()
        })
    }
}

fn upstream_failure() -> AppError {
    AppError::Upstream("Failed to fetch weather data".into())
}
