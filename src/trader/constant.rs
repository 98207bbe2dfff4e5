//! General constant enums used in the simulator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Underlying currency the simulated options are written on.
pub const CURRENCY: &str = "BTC";

/// Width of the strike grid.
pub const STRIKE_STEP: f64 = 100.0;

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Long position (CALL)
    Long,
    /// Short position (PUT)
    Short,
}

impl Direction {
    /// Option leg name used in trade logs.
    pub fn option_type(&self) -> &'static str {
        match self {
            Direction::Long => "CALL",
            Direction::Short => "PUT",
        }
    }

    /// Symbol suffix, CE for calls and PE for puts.
    pub fn symbol_suffix(&self) -> &'static str {
        match self {
            Direction::Long => "CE",
            Direction::Short => "PE",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.option_type())
    }
}

/// Lifecycle status of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PositionStatus {
    /// Open and evaluated every tick
    #[default]
    Open,
    /// Closed by the trailing stop (terminal)
    ClosedStopLoss,
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionStatus::Open => write!(f, "OPEN"),
            PositionStatus::ClosedStopLoss => write!(f, "CLOSED (SL)"),
        }
    }
}

/// Severity of an engine log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}
