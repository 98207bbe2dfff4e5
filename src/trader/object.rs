//! Basic data structures used by the simulator.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::constant::{Direction, LogLevel, PositionStatus, CURRENCY};
use super::error::ConfigError;

/// Stop-loss distance used when the input leaves it blank.
pub const DEFAULT_STOP_LOSS_PERCENT: f64 = 2.0;

/// One simulated option position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub id: u64,
    pub symbol: String,
    pub direction: Direction,
    pub strike: f64,

    pub entry_price: f64,
    /// Highest price since open for longs, lowest for shorts.
    pub extreme_price: f64,
    pub stop_loss_price: f64,
    pub stop_loss_percent: f64,
    pub lots: f64,

    pub current_pnl: f64,
    pub status: PositionStatus,
    pub exit_price: Option<f64>,
}

impl PositionData {
    /// Create an open position with its initial stop placed `stop_loss_percent` away from entry.
    pub fn new(
        id: u64,
        direction: Direction,
        strike: f64,
        entry_price: f64,
        lots: f64,
        stop_loss_percent: f64,
    ) -> Self {
        Self {
            id,
            symbol: format!("{}-{}-{}", CURRENCY, strike, direction.symbol_suffix()),
            direction,
            strike,
            entry_price,
            extreme_price: entry_price,
            stop_loss_price: stop_price_from(direction, entry_price, stop_loss_percent),
            stop_loss_percent,
            lots,
            current_pnl: 0.0,
            status: PositionStatus::Open,
            exit_price: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// P&L of this position if marked at `price`.
    pub fn pnl_at(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => (price - self.entry_price) * self.lots,
            Direction::Short => (self.entry_price - price) * self.lots,
        }
    }

    /// Move the position into its terminal state.
    pub fn close(&mut self, exit_price: f64) {
        debug_assert!(self.is_open(), "position {} closed twice", self.id);
        if !self.is_open() {
            return;
        }
        self.status = PositionStatus::ClosedStopLoss;
        self.exit_price = Some(exit_price);
    }
}

/// Trailing stop level `percent` away from `price` on the losing side.
pub fn stop_price_from(direction: Direction, price: f64, percent: f64) -> f64 {
    match direction {
        Direction::Long => price * (1.0 - percent / 100.0),
        Direction::Short => price * (1.0 + percent / 100.0),
    }
}

/// Sizing and stop parameters for opening a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSetting {
    pub lots: Option<f64>,
    /// Dollar amount; overrides `lots` when present.
    pub amount: Option<f64>,
    pub stop_loss_percent: f64,
    /// Informational expiry label, e.g. "24-09-2025".
    pub expiry: Option<String>,
}

impl TradeSetting {
    /// Parse raw text inputs. Empty text leaves a field unset.
    pub fn parse(lots: &str, amount: &str, stop_loss_percent: &str) -> Result<Self, ConfigError> {
        let setting = Self {
            lots: parse_optional("lots", lots)?,
            amount: parse_optional("amount", amount)?,
            stop_loss_percent: parse_optional("stop_loss_percent", stop_loss_percent)?
                .unwrap_or(DEFAULT_STOP_LOSS_PERCENT),
            expiry: None,
        };
        setting.validate()?;
        Ok(setting)
    }

    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    /// Reject non-positive and non-finite numbers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("lots", self.lots)?;
        check_positive("amount", self.amount)?;
        check_positive("stop_loss_percent", Some(self.stop_loss_percent))?;
        Ok(())
    }

    /// Position size at `price`: `amount / price` when an amount is given, else lots (default 1).
    pub fn resolve_lots(&self, price: f64) -> f64 {
        match self.amount {
            Some(amount) => amount / price,
            None => self.lots.unwrap_or(1.0),
        }
    }
}

impl Default for TradeSetting {
    fn default() -> Self {
        Self {
            lots: Some(1.0),
            amount: None,
            stop_loss_percent: DEFAULT_STOP_LOSS_PERCENT,
            expiry: None,
        }
    }
}

fn parse_optional(field: &'static str, text: &str) -> Result<Option<f64>, ConfigError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

fn check_positive(field: &'static str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(ConfigError::NonPositive { field, value: v }),
        _ => Ok(()),
    }
}

/// Log record published to snapshot consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogData {
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
    pub msg: String,
}

impl LogData {
    pub fn new(level: LogLevel, msg: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Local::now(),
            msg: msg.into(),
        }
    }

    /// "[HH:MM:SS] message"
    pub fn line(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_new_long() {
        let pos = PositionData::new(1, Direction::Long, 50000.0, 50000.0, 1.0, 2.0);
        assert_eq!(pos.symbol, "BTC-50000-CE");
        assert_eq!(pos.extreme_price, 50000.0);
        assert!((pos.stop_loss_price - 49000.0).abs() < 1e-9);
        assert!(pos.is_open());
    }

    #[test]
    fn test_position_new_short() {
        let pos = PositionData::new(2, Direction::Short, 49900.0, 50000.0, 1.0, 2.0);
        assert_eq!(pos.symbol, "BTC-49900-PE");
        assert!((pos.stop_loss_price - 51000.0).abs() < 1e-9);
        assert_eq!(pos.pnl_at(49000.0), 1000.0);
    }

    #[test]
    fn test_position_close_sets_exit() {
        let mut pos = PositionData::new(1, Direction::Long, 50000.0, 50000.0, 1.0, 2.0);
        pos.close(48900.0);
        assert_eq!(pos.status, PositionStatus::ClosedStopLoss);
        assert_eq!(pos.exit_price, Some(48900.0));
    }

    #[test]
    fn test_trade_setting_parse() {
        let setting = TradeSetting::parse("2", "", "").unwrap();
        assert_eq!(setting.lots, Some(2.0));
        assert_eq!(setting.amount, None);
        assert_eq!(setting.stop_loss_percent, DEFAULT_STOP_LOSS_PERCENT);

        let err = TradeSetting::parse("two", "", "2").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { field: "lots", .. }));

        let err = TradeSetting::parse("1", "-100", "2").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "amount", .. }));

        let err = TradeSetting::parse("0", "", "2").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "lots", .. }));
    }

    #[test]
    fn test_amount_overrides_lots() {
        let setting = TradeSetting {
            lots: Some(3.0),
            amount: Some(5000.0),
            ..TradeSetting::default()
        };
        assert_eq!(setting.resolve_lots(50000.0), 0.1);
        assert_eq!(TradeSetting::default().resolve_lots(50000.0), 1.0);
    }

    #[test]
    fn test_log_line_format() {
        let log = LogData::new(LogLevel::Info, "hello");
        let line = log.line();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] hello"));
    }
}
