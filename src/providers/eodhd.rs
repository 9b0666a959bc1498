use crate::core::config::{EodhdProviderConfig, HttpConfig};
use crate::core::provider::{ProviderError, TrackerProvider};
use crate::core::quote::{Bar, HistorySeries, TrackerQuote};
use crate::providers::util::{build_client, get_text, lenient_f64, with_retry};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, instrument};

const PROVIDER: &str = "EODHD";

/// Client for the EODHD real-time and end-of-day endpoints.
pub struct EodhdProvider {
    base_url: String,
    api_key: Option<String>,
    exchange: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl EodhdProvider {
    pub fn new(config: &EodhdProviderConfig, http: &HttpConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            exchange: config.exchange.clone(),
            client: build_client(PROVIDER, http)?,
            retries: http.retries,
            retry_delay_ms: http.retry_delay_ms,
        })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential { provider: PROVIDER })
    }

    fn ticker(&self, symbol: &str) -> String {
        format!("{}.{}", symbol, self.exchange)
    }

    fn strip_exchange<'a>(&self, code: &'a str) -> &'a str {
        code.strip_suffix(&format!(".{}", self.exchange))
            .unwrap_or(code)
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, ProviderError> {
        let body = with_retry(
            || get_text(&self.client, PROVIDER, url),
            self.retries,
            self.retry_delay_ms,
        )
        .await?;

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        if let Some(message) = value.get("Error") {
            return Err(ProviderError::ErrorPayload {
                provider: PROVIDER,
                message: message
                    .as_str()
                    .map_or_else(|| message.to_string(), str::to_string),
            });
        }
        Ok(value)
    }
}

#[derive(Debug, Deserialize)]
struct RealTimeQuote {
    code: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    close: Option<f64>,
    #[serde(default, rename = "previousClose", deserialize_with = "lenient_f64")]
    previous_close: Option<f64>,
}

/// A single ticker comes back as an object, several as an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RealTimeResponse {
    Many(Vec<RealTimeQuote>),
    One(RealTimeQuote),
}

#[derive(Debug, Deserialize)]
struct EodBar {
    date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_f64")]
    open: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    close: Option<f64>,
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ProviderError> {
    serde_json::from_value(value).map_err(|e| ProviderError::Malformed {
        provider: PROVIDER,
        message: e.to_string(),
    })
}

#[async_trait]
impl TrackerProvider for EodhdProvider {
    #[instrument(name = "EodhdBatchQuotes", skip(self), fields(count = symbols.len()))]
    async fn batch_quotes(
        &self,
        symbols: &[&str],
    ) -> Result<HashMap<String, TrackerQuote>, ProviderError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }
        let api_key = self.api_key()?;

        let tickers = symbols
            .iter()
            .map(|s| self.ticker(s))
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/api/real-time/{}?api_token={}&fmt=json",
            self.base_url, tickers, api_key
        );
        debug!("Requesting real-time quotes for {}", tickers);

        let quotes = match decode::<RealTimeResponse>(self.get_json(&url).await?)? {
            RealTimeResponse::Many(quotes) => quotes,
            RealTimeResponse::One(quote) => vec![quote],
        };

        let result: HashMap<String, TrackerQuote> = quotes
            .into_iter()
            .map(|q| {
                (
                    self.strip_exchange(&q.code).to_string(),
                    TrackerQuote::new(q.close, q.previous_close),
                )
            })
            .collect();
        debug!(received = result.len(), "Received EODHD quotes");
        Ok(result)
    }

    #[instrument(name = "EodhdHistory", skip(self), fields(symbol = %symbol))]
    async fn history(&self, symbol: &str, from: NaiveDate) -> Result<HistorySeries, ProviderError> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/api/eod/{}?api_token={}&fmt=json&from={}",
            self.base_url,
            self.ticker(symbol),
            api_key,
            from.format("%Y-%m-%d")
        );
        debug!("Requesting daily bars for {} from {}", symbol, from);

        let rows: Vec<EodBar> = decode(self.get_json(&url).await?)?;
        let total = rows.len();
        let bars: Vec<Bar> = rows
            .into_iter()
            .filter_map(|row| {
                Some(Bar {
                    date: row.date,
                    open: row.open?,
                    high: row.high?,
                    low: row.low?,
                    close: row.close?,
                })
            })
            .collect();
        if bars.len() < total {
            debug!(skipped = total - bars.len(), "Dropped bars with missing prices");
        }
        Ok(HistorySeries::from_bars(bars))
    }
}
