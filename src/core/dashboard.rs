//! The data context shared by every session: registry plus cached fetchers.

use crate::core::config::AppConfig;
use crate::core::fetcher::{CacheTtls, RATE_CHANGE_WINDOW, RateFetcher, TrackerFetcher};
use crate::core::instrument::{Category, Instrument, Registry, RegistryError};
use crate::core::provider::{RateProvider, TrackerProvider};
use crate::core::quote::{HistorySeries, Quote};
use chrono::NaiveDate;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, instrument};

/// History of one instrument for the detail view. An empty series means the
/// data is unavailable.
#[derive(Debug, Clone)]
pub struct Detail {
    pub instrument: &'static Instrument,
    pub history: HistorySeries,
    /// Bars were derived from single daily levels.
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint {
    pub instrument: &'static Instrument,
    pub level: Option<f64>,
}

pub struct Dashboard {
    registry: Registry,
    rates: RateFetcher,
    trackers: TrackerFetcher,
    rate_points: usize,
    tracker_start: NaiveDate,
}

impl Dashboard {
    pub fn new(
        registry: Registry,
        rate_provider: Arc<dyn RateProvider>,
        tracker_provider: Arc<dyn TrackerProvider>,
        config: &AppConfig,
    ) -> Self {
        let ttls = CacheTtls::from(&config.cache);
        Self {
            registry,
            rates: RateFetcher::new(rate_provider, ttls),
            trackers: TrackerFetcher::new(tracker_provider, ttls),
            rate_points: config.history.rate_points,
            tracker_start: config.history.tracker_start,
        }
    }

    pub fn registry(&self) -> Registry {
        self.registry
    }

    /// One quote per instrument, in registry order.
    #[instrument(name = "DashboardTiles", skip(self))]
    pub async fn tiles(&self) -> Vec<Quote> {
        let tracker_symbols: Vec<&str> = self.registry.trackers().map(|i| i.symbol).collect();
        let rate_quotes = join_all(self.registry.rates().map(|i| self.rate_quote(i)));
        let (tracker_quotes, rate_quotes) = futures::join!(
            self.trackers.fetch_batch_quotes(&tracker_symbols),
            rate_quotes
        );

        let mut rate_quotes = rate_quotes.into_iter();
        let tiles: Vec<Quote> = self
            .registry
            .all()
            .iter()
            .map(|instrument| match instrument.category {
                Category::Rate => rate_quotes
                    .next()
                    .unwrap_or_else(|| Quote::unavailable(instrument)),
                Category::Tracker => match tracker_quotes.get(instrument.symbol) {
                    Some(q) => Quote::new(instrument, q.last, q.previous_close),
                    None => Quote::unavailable(instrument),
                },
            })
            .collect();
        debug!(
            available = tiles.iter().filter(|q| q.last.is_some()).count(),
            total = tiles.len(),
            "Built tiles"
        );
        tiles
    }

    async fn rate_quote(&self, instrument: &'static Instrument) -> Quote {
        let recent = self
            .rates
            .fetch_recent(instrument.symbol, RATE_CHANGE_WINDOW)
            .await;
        let last = recent.last().copied();
        let previous = recent.len().checked_sub(2).map(|i| recent[i]);
        Quote::new(instrument, last, previous)
    }

    /// History for the detail view of `name`.
    pub async fn detail(&self, name: &str) -> Result<Detail, RegistryError> {
        let instrument = self.registry.resolve(name)?;
        Ok(self.detail_for(instrument).await)
    }

    pub async fn detail_for(&self, instrument: &'static Instrument) -> Detail {
        match instrument.category {
            Category::Rate => {
                let closes = self
                    .rates
                    .fetch_recent_dated(instrument.symbol, self.rate_points)
                    .await;
                Detail {
                    instrument,
                    history: HistorySeries::synthesize(&closes),
                    synthetic: true,
                }
            }
            Category::Tracker => Detail {
                instrument,
                history: self
                    .trackers
                    .fetch_history(instrument.symbol, self.tracker_start)
                    .await,
                synthetic: false,
            },
        }
    }

    /// Latest level of every rate instrument, in registry order.
    pub async fn yield_curve(&self) -> Vec<CurvePoint> {
        join_all(self.registry.rates().map(|instrument| async move {
            CurvePoint {
                instrument,
                level: self.rates.fetch_latest(instrument.symbol).await,
            }
        }))
        .await
    }
}
