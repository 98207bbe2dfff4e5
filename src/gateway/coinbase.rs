//! Coinbase spot price source.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::trader::{FeedError, PriceSource, Settings};

/// Default exchange-rates endpoint
pub const COINBASE_RATES_URL: &str = "https://api.coinbase.com/v2/exchange-rates";

#[derive(Debug, Deserialize)]
struct RatesResponse {
    data: RatesData,
}

#[derive(Debug, Deserialize)]
struct RatesData {
    rates: HashMap<String, String>,
}

/// Fetches the USD rate of one currency from the Coinbase exchange-rates endpoint.
pub struct CoinbasePriceSource {
    client: Client,
    url: String,
    currency: String,
}

impl CoinbasePriceSource {
    /// Create a source with its own HTTP client bounded by `timeout`.
    pub fn new(url: impl Into<String>, currency: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            currency: currency.into(),
        })
    }

    /// Create a source from the `feed.*` settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, FeedError> {
        let url = settings
            .get_string("feed.url")
            .unwrap_or_else(|| COINBASE_RATES_URL.to_string());
        let currency = settings
            .get_string("feed.currency")
            .unwrap_or_else(|| crate::trader::CURRENCY.to_string());
        let timeout = settings.get_int("feed.timeout_secs").unwrap_or(5).max(1) as u64;
        Self::new(url, currency, Duration::from_secs(timeout))
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

#[async_trait]
impl PriceSource for CoinbasePriceSource {
    fn source_name(&self) -> &str {
        "coinbase"
    }

    async fn fetch(&self) -> Result<f64, FeedError> {
        debug!("Coinbase price request: {} currency={}", self.url, self.currency);

        let response = self
            .client
            .get(&self.url)
            .query(&[("currency", self.currency.as_str())])
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let text = response.text().await.map_err(map_request_error)?;
        parse_usd_rate(&text)
    }
}

fn map_request_error(e: reqwest::Error) -> FeedError {
    if e.is_timeout() {
        FeedError::Timeout
    } else {
        FeedError::Http(e)
    }
}

/// Extract `data.rates.USD` from an exchange-rates body.
fn parse_usd_rate(body: &str) -> Result<f64, FeedError> {
    let response: RatesResponse =
        serde_json::from_str(body).map_err(|e| FeedError::Parse(e.to_string()))?;
    let rate = response
        .data
        .rates
        .get("USD")
        .ok_or_else(|| FeedError::Parse("missing USD rate".to_string()))?;
    let price: f64 = rate
        .parse()
        .map_err(|_| FeedError::Parse(format!("invalid USD rate {rate:?}")))?;
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(FeedError::Parse(format!("non-positive USD rate {rate:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usd_rate() {
        let body = r#"{"data":{"currency":"BTC","rates":{"EUR":"45000.10","USD":"50123.45"}}}"#;
        assert_eq!(parse_usd_rate(body).unwrap(), 50123.45);
    }

    #[test]
    fn test_parse_usd_rate_errors() {
        let missing = r#"{"data":{"currency":"BTC","rates":{"EUR":"1"}}}"#;
        assert!(matches!(parse_usd_rate(missing), Err(FeedError::Parse(_))));

        let garbage = r#"{"data":{"currency":"BTC","rates":{"USD":"n/a"}}}"#;
        assert!(matches!(parse_usd_rate(garbage), Err(FeedError::Parse(_))));

        assert!(matches!(parse_usd_rate("not json"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings::with_defaults();
        let source = CoinbasePriceSource::from_settings(&settings).unwrap();
        assert_eq!(source.currency(), "BTC");
        assert_eq!(source.source_name(), "coinbase");
    }
}
