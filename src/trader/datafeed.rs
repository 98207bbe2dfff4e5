//! Price source abstraction.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::FeedError;

/// Price used when the feed fails before any price has been observed.
pub const DEFAULT_FALLBACK_PRICE: f64 = 50_000.0;

/// Source of the current spot price.
///
/// Implementations enforce their own timeout; the engine never waits on them longer
/// than that.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Name of the source, used in logs.
    fn source_name(&self) -> &str;

    /// Fetch the current price.
    async fn fetch(&self) -> Result<f64, FeedError>;
}

/// True for a finite, strictly positive price.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Reject a fetched price that cannot be traded at.
pub fn checked_price(price: f64) -> Result<f64, FeedError> {
    if is_valid_price(price) {
        Ok(price)
    } else {
        Err(FeedError::InvalidPrice(price))
    }
}

/// Price to use after a fetch: the fetched one, else the last known, else `fallback`.
///
/// An unusable fetched price counts as a failed fetch.
pub fn resolve_price(fetched: &Result<f64, FeedError>, last_price: Option<f64>, fallback: f64) -> f64 {
    match fetched {
        Ok(price) if is_valid_price(*price) => *price,
        _ => last_price.unwrap_or(fallback),
    }
}

/// Plays back a scripted price sequence. A `None` entry simulates a feed outage.
///
/// Once the script is exhausted every fetch fails, so the engine keeps using its last price.
pub struct ReplayPriceSource {
    prices: Mutex<VecDeque<Option<f64>>>,
}

impl ReplayPriceSource {
    pub fn new(prices: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            prices: Mutex::new(prices.into_iter().collect()),
        }
    }

    /// Script made only of successful fetches.
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Self {
        Self::new(prices.into_iter().map(Some))
    }
}

#[async_trait]
impl PriceSource for ReplayPriceSource {
    fn source_name(&self) -> &str {
        "replay"
    }

    async fn fetch(&self) -> Result<f64, FeedError> {
        let next = match self.prices.lock() {
            Ok(mut prices) => prices.pop_front(),
            Err(_) => None,
        };
        match next {
            Some(Some(price)) => Ok(price),
            Some(None) => Err(FeedError::Timeout),
            None => Err(FeedError::Exhausted),
        }
    }
}
