//! Trader module - shared building blocks of the simulator.
//!
//! - **constant**: Direction, PositionStatus, LogLevel
//! - **object**: PositionData, TradeSetting, LogData
//! - **error**: FeedError, ConfigError, EngineError
//! - **setting**: Global settings management
//! - **logger**: Logging setup
//! - **datafeed**: PriceSource abstraction
//! - **utility**: Paths and rounding helpers

pub mod constant;
pub mod datafeed;
pub mod error;
pub mod logger;
pub mod object;
pub mod setting;
pub mod utility;

// Re-exports for convenience
pub use constant::{Direction, LogLevel, PositionStatus, CURRENCY, STRIKE_STEP};
pub use datafeed::{
    checked_price, is_valid_price, resolve_price, PriceSource, ReplayPriceSource,
    DEFAULT_FALLBACK_PRICE,
};
pub use error::{ConfigError, EngineError, FeedError};
pub use logger::{init_logger, write_log, DEBUG, ERROR, INFO, WARNING};
pub use object::{stop_price_from, LogData, PositionData, TradeSetting, DEFAULT_STOP_LOSS_PERCENT};
pub use setting::{SettingValue, Settings, SETTINGS};
pub use utility::{get_file_path, get_folder_path, round_to, strike_from, TEMP_DIR};
