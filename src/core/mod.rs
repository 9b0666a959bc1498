//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod fetcher;
pub mod instrument;
pub mod log;
pub mod metrics;
pub mod provider;
pub mod quote;
pub mod selection;

// Re-export main types for cleaner imports
pub use dashboard::{CurvePoint, Dashboard, Detail};
pub use instrument::{Category, Instrument, Registry, RegistryError};
pub use provider::{ProviderError, RateProvider, TrackerProvider};
pub use quote::{Bar, HistorySeries, Quote, TrackerQuote};
pub use selection::Selection;
