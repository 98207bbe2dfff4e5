//! Price feed gateways.

pub mod coinbase;

pub use coinbase::{CoinbasePriceSource, COINBASE_RATES_URL};
