use crate::core::config::{FredProviderConfig, HttpConfig};
use crate::core::provider::{ProviderError, RateProvider};
use crate::core::quote::Observation;
use crate::providers::util::{build_client, get_text, lenient_f64, with_retry};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument};

const PROVIDER: &str = "FRED";

/// Client for the FRED series observations endpoint.
pub struct FredProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl FredProvider {
    pub fn new(config: &FredProviderConfig, http: &HttpConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: build_client(PROVIDER, http)?,
            retries: http.retries,
            retry_delay_ms: http.retry_delay_ms,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Option<Vec<FredObservation>>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_f64")]
    value: Option<f64>,
}

fn parse_observations(body: &str) -> Result<Vec<Observation>, ProviderError> {
    let response: ObservationsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    if let Some(message) = response.error_message {
        return Err(ProviderError::ErrorPayload {
            provider: PROVIDER,
            message,
        });
    }

    let mut observations: Vec<Observation> = response
        .observations
        .ok_or_else(|| ProviderError::Malformed {
            provider: PROVIDER,
            message: "missing observations".to_string(),
        })?
        .into_iter()
        .map(|o| Observation {
            date: o.date,
            value: o.value,
        })
        .collect();
    observations.sort_by_key(|o| o.date);
    Ok(observations)
}

#[async_trait]
impl RateProvider for FredProvider {
    #[instrument(name = "FredObservations", skip(self), fields(series = %series))]
    async fn observations(&self, series: &str) -> Result<Vec<Observation>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential { provider: PROVIDER })?;

        let url = format!(
            "{}/fred/series/observations?series_id={}&api_key={}&file_type=json",
            self.base_url, series, api_key
        );
        debug!("Requesting observations for {}", series);

        let body = with_retry(
            || get_text(&self.client, PROVIDER, &url),
            self.retries,
            self.retry_delay_ms,
        )
        .await?;

        let observations = parse_observations(&body)?;
        debug!(count = observations.len(), "Received FRED observations");
        Ok(observations)
    }
}
