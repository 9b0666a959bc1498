//! Provider abstractions for rate series and tracker quotes

use crate::core::quote::{HistorySeries, Observation, TrackerQuote};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request to {provider} failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error: {status} from {provider}")]
    Status {
        provider: &'static str,
        status: StatusCode,
    },
    #[error("{provider} reported an error: {message}")]
    ErrorPayload {
        provider: &'static str,
        message: String,
    },
    #[error("Malformed {provider} response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },
    #[error("No API key configured for {provider}")]
    MissingCredential { provider: &'static str },
}

impl ProviderError {
    /// Wraps a transport error without its URL, which carries the API key.
    pub(crate) fn request(provider: &'static str, source: reqwest::Error) -> Self {
        ProviderError::Request {
            provider,
            source: source.without_url(),
        }
    }

    /// Whether a retry could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Request { source, .. } => !source.is_builder(),
            ProviderError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

/// Macro data provider publishing one level per day for a named series.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// All observations of `series`, oldest first. Missing values are kept as `None`.
    async fn observations(&self, series: &str) -> Result<Vec<Observation>, ProviderError>;
}

/// Market data provider for exchange-traded trackers.
#[async_trait]
pub trait TrackerProvider: Send + Sync {
    /// Latest quotes for all `symbols` in one request, keyed by symbol.
    async fn batch_quotes(
        &self,
        symbols: &[&str],
    ) -> Result<HashMap<String, TrackerQuote>, ProviderError>;

    /// Daily bars for `symbol` from `from` until today.
    async fn history(&self, symbol: &str, from: NaiveDate) -> Result<HistorySeries, ProviderError>;
}
