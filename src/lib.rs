//! Options Sim - a simulated options position manager
//!
//! This crate provides:
//!
//! - A position ledger with per-session trade counters and accounting
//! - A trailing stop-loss engine that only ever tightens stops
//! - Pluggable entry signals
//! - A single-writer engine task driven by a timer and a command queue
//! - A non-blocking snapshot channel for observers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use options_sim::strategy::{EngineConfig, OscillatorBands, RandomOscillatorSignal, StrategyEngine};
//! use options_sim::trader::{Direction, ReplayPriceSource, TradeSetting};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (engine, mut events) = StrategyEngine::spawn(
//!         EngineConfig::default(),
//!         Arc::new(ReplayPriceSource::from_prices([50000.0, 50500.0])),
//!         Box::new(RandomOscillatorSignal::new(OscillatorBands::default())),
//!         Arc::new(TradeSetting::default()),
//!     );
//!
//!     let position = engine
//!         .place_manual_trade(Direction::Long, TradeSetting::default())
//!         .await
//!         .unwrap();
//!     println!("opened {}", position.symbol);
//!
//!     for event in events.drain() {
//!         println!("{}", event.event_type());
//!     }
//!     engine.shutdown().await;
//! }
//! ```

pub mod event;
pub mod gateway;
pub mod strategy;
pub mod trader;

// Re-export commonly used types
pub use event::{EngineEvent, PriceUpdate, SnapshotReceiver};
pub use gateway::CoinbasePriceSource;
pub use strategy::{EngineConfig, PositionLedger, Signal, SignalEngine, StrategyEngine};
pub use trader::{
    ConfigError, Direction, EngineError, FeedError, LogLevel, PositionData, PositionStatus,
    PriceSource, TradeSetting,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
