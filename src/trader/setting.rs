//! Global setting of the simulator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use std::sync::{LazyLock, RwLock};

use super::utility::get_file_path;

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    // Log settings
    settings.insert("log.level".to_string(), SettingValue::Int(20)); // INFO level
    settings.insert("log.console".to_string(), SettingValue::Bool(true));
    settings.insert("log.file".to_string(), SettingValue::Bool(true));

    // Engine settings
    settings.insert("engine.tick_interval_ms".to_string(), SettingValue::Int(10_000));
    settings.insert("engine.max_open_positions".to_string(), SettingValue::Int(3));
    settings.insert("engine.max_trades_per_session".to_string(), SettingValue::Int(10));
    settings.insert("engine.fallback_price".to_string(), SettingValue::Float(50_000.0));
    settings.insert("engine.initial_balance".to_string(), SettingValue::Float(0.0));
    settings.insert("engine.channel_capacity".to_string(), SettingValue::Int(1024));

    // Price feed settings
    settings.insert(
        "feed.url".to_string(),
        SettingValue::String("https://api.coinbase.com/v2/exchange-rates".to_string()),
    );
    settings.insert("feed.currency".to_string(), SettingValue::String("BTC".to_string()));
    settings.insert("feed.timeout_secs".to_string(), SettingValue::Int(5));

    // Signal settings
    settings.insert("signal.low".to_string(), SettingValue::Float(20.0));
    settings.insert("signal.high".to_string(), SettingValue::Float(80.0));
    settings.insert("signal.upper_band".to_string(), SettingValue::Float(60.0));
    settings.insert("signal.lower_band".to_string(), SettingValue::Float(40.0));

    // Trade input settings
    settings.insert("trade.lots".to_string(), SettingValue::String("1".to_string()));
    settings.insert("trade.amount".to_string(), SettingValue::String(String::new()));
    settings.insert("trade.stop_loss_percent".to_string(), SettingValue::String("2.0".to_string()));
    settings.insert("trade.expiry".to_string(), SettingValue::String("24-09-2025".to_string()));

    settings
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SettingValue {
    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Global settings container
pub struct Settings {
    settings: RwLock<HashMap<String, SettingValue>>,
}

impl Settings {
    /// Create new Settings with defaults, overlaid with the setting file if present
    pub fn new() -> Self {
        let mut settings = Self::with_defaults();
        if let Some(file_settings) = load_settings_from_file(&get_file_path(SETTING_FILENAME)) {
            settings.update(file_settings);
        }
        settings
    }

    /// Create Settings holding only the built-in defaults
    pub fn with_defaults() -> Self {
        Self {
            settings: RwLock::new(default_settings()),
        }
    }

    /// Get a setting value
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.settings.read().ok()?.get(key).cloned()
    }

    /// Get a string setting
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Get an integer setting
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    /// Get a float setting
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_float())
    }

    /// Get a bool setting
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Set a setting value
    pub fn set(&self, key: impl Into<String>, value: SettingValue) {
        if let Ok(mut settings) = self.settings.write() {
            settings.insert(key.into(), value);
        }
    }

    /// Update settings from a map
    pub fn update(&mut self, new_settings: HashMap<String, SettingValue>) {
        if let Ok(settings) = self.settings.get_mut() {
            settings.extend(new_settings);
        }
    }

    /// Save settings to the setting file
    pub fn save(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let filepath = get_file_path(SETTING_FILENAME);
        self.save_to(&filepath)?;
        Ok(filepath)
    }

    /// Save settings as JSON to `filepath`
    pub fn save_to(&self, filepath: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let settings = self.settings.read().map_err(|e| e.to_string())?;
        let json = serde_json::to_string_pretty(&*settings)?;
        fs::write(filepath, json)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Setting filename
const SETTING_FILENAME: &str = "sim_setting.json";

/// Load settings from JSON file
fn load_settings_from_file(filepath: &Path) -> Option<HashMap<String, SettingValue>> {
    if filepath.exists() {
        let content = fs::read_to_string(filepath).ok()?;
        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {}", filepath.display(), e);
                None
            }
        }
    } else {
        None
    }
}

/// Global settings instance
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new);
