//! Strategy Base Types
//!
//! Lifecycle status, engine configuration and the trade input contract

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::DEFAULT_CHANNEL_CAPACITY;
use crate::trader::{is_valid_price, ConfigError, Settings, TradeSetting, DEFAULT_FALLBACK_PRICE};

/// Engine lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStatus {
    /// Not ticking
    Idle,
    /// Ticking and trading
    Running,
    /// Ticking but not mutating anything
    Paused,
}

impl EngineStatus {
    pub fn from_flags(running: bool, paused: bool) -> Self {
        match (running, paused) {
            (false, _) => EngineStatus::Idle,
            (true, false) => EngineStatus::Running,
            (true, true) => EngineStatus::Paused,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Period of the strategy loop
    pub tick_interval: Duration,
    /// Signal-path cap on concurrently open positions
    pub max_open_positions: usize,
    /// Signal-path cap on opens per session
    pub max_trades_per_session: u32,
    /// Price used when the feed fails and no price was ever observed
    pub fallback_price: f64,
    pub initial_balance: f64,
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
            max_open_positions: 3,
            max_trades_per_session: 10,
            fallback_price: DEFAULT_FALLBACK_PRICE,
            initial_balance: 0.0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Read the `engine.*` settings, keeping defaults for missing keys.
    pub fn from_settings(settings: &Settings) -> Self {
        let default = Self::default();
        Self {
            tick_interval: settings
                .get_int("engine.tick_interval_ms")
                .filter(|ms| *ms > 0)
                .map(|ms| Duration::from_millis(ms as u64))
                .unwrap_or(default.tick_interval),
            max_open_positions: settings
                .get_int("engine.max_open_positions")
                .map(|n| n.max(0) as usize)
                .unwrap_or(default.max_open_positions),
            max_trades_per_session: settings
                .get_int("engine.max_trades_per_session")
                .map(|n| n.clamp(0, u32::MAX as i64) as u32)
                .unwrap_or(default.max_trades_per_session),
            fallback_price: settings
                .get_float("engine.fallback_price")
                .filter(|price| is_valid_price(*price))
                .unwrap_or(default.fallback_price),
            initial_balance: settings
                .get_float("engine.initial_balance")
                .unwrap_or(default.initial_balance),
            channel_capacity: settings
                .get_int("engine.channel_capacity")
                .map(|n| n.max(2) as usize)
                .unwrap_or(default.channel_capacity),
        }
    }
}

/// Supplier of the sizing and stop parameters, read once per open decision.
pub trait TradeInputs: Send + Sync {
    fn trade_setting(&self) -> Result<TradeSetting, ConfigError>;
}

impl TradeInputs for TradeSetting {
    fn trade_setting(&self) -> Result<TradeSetting, ConfigError> {
        self.validate()?;
        Ok(self.clone())
    }
}

impl<F> TradeInputs for F
where
    F: Fn() -> Result<TradeSetting, ConfigError> + Send + Sync,
{
    fn trade_setting(&self) -> Result<TradeSetting, ConfigError> {
        self()
    }
}

/// Reads the `trade.*` text settings on every call, so edits take effect on the next decision.
pub struct SettingsTradeInputs<'a> {
    settings: &'a Settings,
}

impl<'a> SettingsTradeInputs<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

impl TradeInputs for SettingsTradeInputs<'_> {
    fn trade_setting(&self) -> Result<TradeSetting, ConfigError> {
        let text = |key: &str| self.settings.get_string(key).unwrap_or_default();
        let setting = TradeSetting::parse(
            &text("trade.lots"),
            &text("trade.amount"),
            &text("trade.stop_loss_percent"),
        )?;
        Ok(match self.settings.get_string("trade.expiry") {
            Some(expiry) if !expiry.is_empty() => setting.with_expiry(expiry),
            _ => setting,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trader::SettingValue;

    #[test]
    fn test_status_from_flags() {
        assert_eq!(EngineStatus::from_flags(false, true), EngineStatus::Idle);
        assert_eq!(EngineStatus::from_flags(true, false), EngineStatus::Running);
        assert_eq!(EngineStatus::from_flags(true, true), EngineStatus::Paused);
    }

    #[test]
    fn test_config_from_default_settings() {
        let config = EngineConfig::from_settings(&Settings::with_defaults());
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_ignores_unusable_fallback_price() {
        let settings = Settings::with_defaults();
        settings.set("engine.fallback_price", SettingValue::Float(0.0));
        assert_eq!(EngineConfig::from_settings(&settings).fallback_price, DEFAULT_FALLBACK_PRICE);

        settings.set("engine.fallback_price", SettingValue::Float(-1.0));
        assert_eq!(EngineConfig::from_settings(&settings).fallback_price, DEFAULT_FALLBACK_PRICE);

        settings.set("engine.fallback_price", SettingValue::Float(42_000.0));
        assert_eq!(EngineConfig::from_settings(&settings).fallback_price, 42_000.0);
    }

    #[test]
    fn test_settings_trade_inputs() {
        let settings = Settings::with_defaults();
        let inputs = SettingsTradeInputs::new(&settings);
        let setting = inputs.trade_setting().unwrap();
        assert_eq!(setting.lots, Some(1.0));
        assert_eq!(setting.stop_loss_percent, 2.0);
        assert_eq!(setting.expiry.as_deref(), Some("24-09-2025"));

        settings.set("trade.amount", SettingValue::String("5000".to_string()));
        assert_eq!(inputs.trade_setting().unwrap().amount, Some(5000.0));

        settings.set("trade.stop_loss_percent", SettingValue::String("abc".to_string()));
        assert!(inputs.trade_setting().is_err());
    }

    #[test]
    fn test_closure_trade_inputs() {
        let inputs = || -> Result<TradeSetting, ConfigError> {
            Err(ConfigError::Unavailable("form closed".to_string()))
        };
        assert!(inputs.trade_setting().is_err());
        assert!(TradeSetting::default().trade_setting().is_ok());
    }
}
