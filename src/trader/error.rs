//! Error types for the simulator.

use thiserror::Error;

/// Failure of a price fetch. Always recovered by the engine with a fallback price.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("price request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price request returned status {0}")]
    Status(u16),

    #[error("could not parse price from response: {0}")]
    Parse(String),

    #[error("price request timed out")]
    Timeout,

    #[error("price feed has no more data")]
    Exhausted,

    #[error("price feed returned unusable price {0}")]
    InvalidPrice(f64),
}

/// Malformed numeric trade input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("trade setting unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a command sent to the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("engine task is no longer running")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::InvalidNumber {
            field: "lots",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "lots must be a number, got \"abc\"");

        let err: EngineError = ConfigError::NonPositive { field: "amount", value: -5.0 }.into();
        assert_eq!(err.to_string(), "amount must be positive, got -5");
    }
}
