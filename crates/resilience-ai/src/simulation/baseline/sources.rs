use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::warn;

use super::super::taxonomy::Country;
use super::indicators::IndicatorSpec;

const WORLD_BANK_BASE: &str = "https://api.worldbank.org/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);
const MAX_CONCURRENT_REQUESTS: usize = 12;

/// Latest observation for one country/indicator pair. Both fields are
/// nullable; a source that cannot answer degrades to an empty observation
/// rather than failing the whole baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorObservation {
    pub value: Option<f64>,
    pub year: Option<String>,
}

/// Error raised by an indicator source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("indicator request failed: {0}")]
    Transport(String),
    #[error("unexpected indicator payload shape")]
    Payload,
}

/// Upstream supplier of raw indicator values. The baseline provider only
/// depends on this contract; fetch mechanics stay behind it.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Most recent non-null observation for one country.
    async fn latest(
        &self,
        country: Country,
        indicator: &IndicatorSpec,
    ) -> Result<IndicatorObservation, SourceError>;

    /// Latest value per reporting country worldwide, used as the percentile
    /// reference distribution. An empty list means no reference exists.
    async fn global_latest(&self, indicator: &IndicatorSpec) -> Result<Vec<f64>, SourceError>;
}

/// World Bank v2 REST client. Requests across the 10x10 country/indicator
/// fan-out share a semaphore so a baseline refresh never opens more than
/// [`MAX_CONCURRENT_REQUESTS`] connections.
pub struct WorldBankSource {
    client: reqwest::Client,
    limiter: Arc<Semaphore>,
}

impl WorldBankSource {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            limiter: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, SourceError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| SourceError::Transport("request limiter closed".to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| SourceError::Transport(err.to_string()))?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))
    }
}

impl Default for WorldBankSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndicatorSource for WorldBankSource {
    async fn latest(
        &self,
        country: Country,
        indicator: &IndicatorSpec,
    ) -> Result<IndicatorObservation, SourceError> {
        let url = format!(
            "{WORLD_BANK_BASE}/country/{}/indicator/{}?format=json",
            country.iso3(),
            indicator.code
        );
        let payload = self.fetch_json(&url).await?;
        Ok(latest_observation(&payload))
    }

    async fn global_latest(&self, indicator: &IndicatorSpec) -> Result<Vec<f64>, SourceError> {
        let url = format!(
            "{WORLD_BANK_BASE}/country/all/indicator/{}?format=json&per_page=20000",
            indicator.code
        );
        let payload = self.fetch_json(&url).await?;
        let values = global_values(&payload);
        if values.is_empty() {
            warn!(indicator = indicator.name, "empty global reference distribution");
        }
        Ok(values)
    }
}

/// World Bank payloads are `[metadata, rows]`; rows are newest-first, so
/// the first non-null value is the latest observation.
fn latest_observation(payload: &serde_json::Value) -> IndicatorObservation {
    let Some(rows) = payload.get(1).and_then(|rows| rows.as_array()) else {
        return IndicatorObservation::default();
    };

    for row in rows {
        if let Some(value) = row.get("value").and_then(|value| value.as_f64()) {
            let year = row
                .get("date")
                .and_then(|date| date.as_str())
                .map(str::to_string);
            return IndicatorObservation {
                value: Some(value),
                year,
            };
        }
    }

    IndicatorObservation::default()
}

/// Keep the first (latest) non-null value per reporting country id.
fn global_values(payload: &serde_json::Value) -> Vec<f64> {
    let Some(rows) = payload.get(1).and_then(|rows| rows.as_array()) else {
        return Vec::new();
    };

    let mut seen = std::collections::HashSet::new();
    let mut values = Vec::new();
    for row in rows {
        let Some(value) = row.get("value").and_then(|value| value.as_f64()) else {
            continue;
        };
        let Some(country) = row
            .get("country")
            .and_then(|country| country.get("id"))
            .and_then(|id| id.as_str())
        else {
            continue;
        };
        if seen.insert(country.to_string()) {
            values.push(value);
        }
    }

    values
}
