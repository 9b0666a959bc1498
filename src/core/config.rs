use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const FRED_API_KEY_ENV: &str = "FRED_API_KEY";
pub const EODHD_API_KEY_ENV: &str = "EODHD_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FredProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for FredProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.stlouisfed.org".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EodhdProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Exchange suffix appended to every ticker, e.g. `SHY.US`.
    pub exchange: String,
}

impl Default for EodhdProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eodhd.com".to_string(),
            api_key: None,
            exchange: "US".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub fred: FredProviderConfig,
    pub eodhd: EodhdProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub live_ttl_secs: u64,
    pub historical_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            live_ttl_secs: 30,
            historical_ttl_secs: 3600,
        }
    }
}

impl CacheConfig {
    pub fn live_ttl(&self) -> Duration {
        Duration::from_secs(self.live_ttl_secs)
    }

    pub fn historical_ttl(&self) -> Duration {
        Duration::from_secs(self.historical_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of observations charted for rate instruments.
    pub rate_points: usize,
    /// First day of tracker history.
    pub tracker_start: NaiveDate,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            rate_points: 180,
            tracker_start: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            retries: 2,
            retry_delay_ms: 500,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
    pub history: HistoryConfig,
    pub http: HttpConfig,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when it
    /// does not exist. API keys from the environment take precedence.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        let config = if config_path.exists() {
            Self::read(&config_path)?
        } else {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };
        Ok(config.with_env_overrides(|k| std::env::var(k).ok()))
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "bondterm", "bondterm")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config = Self::read(path.as_ref())?;
        Ok(config.with_env_overrides(|k| std::env::var(k).ok()))
    }

    fn read(path: &std::path::Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Replaces API keys with values found by `lookup`, keyed by env var name.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(FRED_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.providers.fred.api_key = Some(key);
        }
        if let Some(key) = lookup(EODHD_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.providers.eodhd.api_key = Some(key);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  fred:
    base_url: "http://example.com/fred"
    api_key: "fred-key"
  eodhd:
    api_key: "eod-key"
cache:
  live_ttl_secs: 5
history:
  rate_points: 90
  tracker_start: "2020-06-01"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.providers.fred.base_url, "http://example.com/fred");
        assert_eq!(config.providers.fred.api_key.as_deref(), Some("fred-key"));
        assert_eq!(config.providers.eodhd.base_url, "https://eodhd.com");
        assert_eq!(config.providers.eodhd.exchange, "US");
        assert_eq!(config.providers.eodhd.api_key.as_deref(), Some("eod-key"));
        assert_eq!(config.cache.live_ttl(), Duration::from_secs(5));
        assert_eq!(config.cache.historical_ttl(), Duration::from_secs(3600));
        assert_eq!(config.history.rate_points, 90);
        assert_eq!(
            config.history.tracker_start,
            NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
        );
        assert_eq!(config.http.timeout_secs, 10);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.providers.fred.base_url, "https://api.stlouisfed.org");
        assert!(config.providers.fred.api_key.is_none());
        assert_eq!(config.cache.live_ttl_secs, 30);
        assert_eq!(config.history.rate_points, 180);
        assert_eq!(
            config.history.tracker_start,
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_env_overrides_api_keys() {
        let mut config = AppConfig::default();
        config.providers.fred.api_key = Some("from-file".to_string());

        let config = config.with_env_overrides(|name| match name {
            FRED_API_KEY_ENV => Some("from-env".to_string()),
            EODHD_API_KEY_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.providers.fred.api_key.as_deref(), Some("from-env"));
        assert!(config.providers.eodhd.api_key.is_none());
    }

    #[test]
    fn test_load_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "http:\n  retries: 0\n").unwrap();
        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.http.retries, 0);

        let missing = AppConfig::load_from_path("/nonexistent/bondterm.yaml");
        assert!(missing.unwrap_err().to_string().contains("Failed to read config file"));
    }
}
