//! Cached, failure-tolerant access to the rate and tracker providers.
//!
//! Provider errors stop here: they are logged and turned into absent values or
//! empty collections, and never cached.

use crate::core::cache::Cache;
use crate::core::config::CacheConfig;
use crate::core::provider::{ProviderError, RateProvider, TrackerProvider};
use crate::core::quote::{HistorySeries, Observation, TrackerQuote};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Windows up to this size feed the live tiles; longer ones are chart history.
pub const RATE_CHANGE_WINDOW: usize = 2;

/// The two staleness classes: live quotes and historical bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub live: Duration,
    pub historical: Duration,
}

impl From<&CacheConfig> for CacheTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            live: config.live_ttl(),
            historical: config.historical_ttl(),
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

pub struct RateFetcher {
    provider: Arc<dyn RateProvider>,
    ttls: CacheTtls,
    recent: Cache<String, Vec<(NaiveDate, f64)>>,
}

impl RateFetcher {
    pub fn new(provider: Arc<dyn RateProvider>, ttls: CacheTtls) -> Self {
        Self {
            provider,
            ttls,
            recent: Cache::new(),
        }
    }

    /// Latest published level of `symbol`, or `None` if unavailable. Shares
    /// the cached change window with the tiles.
    pub async fn fetch_latest(&self, symbol: &str) -> Option<f64> {
        self.fetch_recent(symbol, RATE_CHANGE_WINDOW)
            .await
            .last()
            .copied()
    }

    /// Up to `n` most recent levels, oldest first.
    pub async fn fetch_recent(&self, symbol: &str, n: usize) -> Vec<f64> {
        self.fetch_recent_dated(symbol, n)
            .await
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }

    /// Up to `n` most recent dated levels, oldest first. Missing observations
    /// are dropped before the window is applied.
    pub async fn fetch_recent_dated(&self, symbol: &str, n: usize) -> Vec<(NaiveDate, f64)> {
        match self.try_fetch_recent(symbol, n).await {
            Ok(values) => values,
            Err(e) => {
                warn!(symbol, error = %e, "Rate series unavailable");
                Vec::new()
            }
        }
    }

    pub async fn try_fetch_recent(
        &self,
        symbol: &str,
        n: usize,
    ) -> Result<Vec<(NaiveDate, f64)>, ProviderError> {
        let ttl = if n <= RATE_CHANGE_WINDOW {
            self.ttls.live
        } else {
            self.ttls.historical
        };
        let key = format!("{symbol}:{n}");
        self.recent
            .get_or_fetch(key, ttl, || async {
                let observations = self.provider.observations(symbol).await?;
                Ok::<_, ProviderError>(last_values(&observations, n))
            })
            .await
    }
}

fn last_values(observations: &[Observation], n: usize) -> Vec<(NaiveDate, f64)> {
    let values: Vec<_> = observations
        .iter()
        .filter_map(|o| o.value.map(|v| (o.date, v)))
        .collect();
    values[values.len().saturating_sub(n)..].to_vec()
}

pub struct TrackerFetcher {
    provider: Arc<dyn TrackerProvider>,
    ttls: CacheTtls,
    quotes: Cache<String, HashMap<String, TrackerQuote>>,
    history: Cache<String, HistorySeries>,
}

impl TrackerFetcher {
    pub fn new(provider: Arc<dyn TrackerProvider>, ttls: CacheTtls) -> Self {
        Self {
            provider,
            ttls,
            quotes: Cache::new(),
            history: Cache::new(),
        }
    }

    /// Quotes for all `symbols` from one batched request. A symbol missing from
    /// the result has no quote; a failed request yields an empty map.
    pub async fn fetch_batch_quotes(&self, symbols: &[&str]) -> HashMap<String, TrackerQuote> {
        match self.try_fetch_batch_quotes(symbols).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(symbols = %symbols.join(","), error = %e, "Tracker quotes unavailable");
                HashMap::new()
            }
        }
    }

    pub async fn try_fetch_batch_quotes(
        &self,
        symbols: &[&str],
    ) -> Result<HashMap<String, TrackerQuote>, ProviderError> {
        let key = symbols.join(",");
        self.quotes
            .get_or_fetch(key, self.ttls.live, || self.provider.batch_quotes(symbols))
            .await
    }

    /// Daily bars since `from`; empty when the provider fails.
    pub async fn fetch_history(&self, symbol: &str, from: NaiveDate) -> HistorySeries {
        match self.try_fetch_history(symbol, from).await {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol, error = %e, "Tracker history unavailable");
                HistorySeries::default()
            }
        }
    }

    pub async fn try_fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
    ) -> Result<HistorySeries, ProviderError> {
        let key = format!("{symbol}:{from}");
        self.history
            .get_or_fetch(key, self.ttls.historical, || self.provider.history(symbol, from))
            .await
    }
}
