//! Strategy Framework
//!
//! Position ledger, trailing stop-loss, entry signals and the engine task
//! that drives them on a timer.

pub mod base;
pub mod engine;
pub mod ledger;
pub mod signal;
pub mod stop_loss;

pub use base::{EngineConfig, EngineStatus, SettingsTradeInputs, TradeInputs};
pub use engine::StrategyEngine;
pub use ledger::PositionLedger;
pub use signal::{
    OscillatorBands, RandomOscillatorSignal, ScriptedSignal, Signal, SignalContext, SignalEngine,
};
pub use stop_loss::Evaluation;
