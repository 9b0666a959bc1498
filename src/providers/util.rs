use crate::core::config::HttpConfig;
use crate::core::provider::ProviderError;
use serde::{Deserialize, Deserializer};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub(crate) fn build_client(provider: &'static str, http: &HttpConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(concat!("bondterm/", env!("CARGO_PKG_VERSION")))
        .timeout(http.timeout())
        .build()
        .map_err(|source| ProviderError::request(provider, source))
}

/// Retries an async operation while it fails with a transient error
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error of the last attempt
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries || !err.is_transient() {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Sends a GET request and returns the body of a successful response.
pub(crate) async fn get_text(
    client: &reqwest::Client,
    provider: &'static str,
    url: &str,
) -> Result<String, ProviderError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ProviderError::request(provider, source))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status { provider, status });
    }

    response
        .text()
        .await
        .map_err(|source| ProviderError::request(provider, source))
}

/// Deserializes a number that may also arrive as a string (`"3.95"`), or as a
/// placeholder such as `"."` or `"NA"`, which becomes `None`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    let value = match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}
