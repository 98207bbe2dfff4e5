//! Entry signals.
//!
//! The engine only sees the [`SignalEngine`] trait. The reference
//! [`RandomOscillatorSignal`] is a stand-in oscillator drawn uniformly at random on
//! every call, so its decisions are intentionally non-deterministic. Tests and
//! replays plug in [`ScriptedSignal`] instead.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::trader::{PositionData, Settings};

/// Decision of a signal for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    OpenLong,
    OpenShort,
    Hold,
}

/// Market and account view handed to a signal.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub price: f64,
    pub open_positions: usize,
    pub trades_today: u32,
    pub positions: &'a [PositionData],
}

/// Named, swappable entry decision.
pub trait SignalEngine: Send {
    fn signal_name(&self) -> &str;

    fn decide(&mut self, context: &SignalContext<'_>) -> Signal;
}

/// Sampling range and thresholds of the oscillator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorBands {
    pub low: f64,
    pub high: f64,
    pub lower_band: f64,
    pub upper_band: f64,
}

impl Default for OscillatorBands {
    fn default() -> Self {
        Self {
            low: 20.0,
            high: 80.0,
            lower_band: 40.0,
            upper_band: 60.0,
        }
    }
}

impl OscillatorBands {
    pub fn from_settings(settings: &Settings) -> Self {
        let default = Self::default();
        let bands = Self {
            low: settings.get_float("signal.low").unwrap_or(default.low),
            high: settings.get_float("signal.high").unwrap_or(default.high),
            lower_band: settings.get_float("signal.lower_band").unwrap_or(default.lower_band),
            upper_band: settings.get_float("signal.upper_band").unwrap_or(default.upper_band),
        };
        bands.or_default()
    }

    /// Non-empty, finite sampling range and ordered thresholds.
    pub fn is_valid(&self) -> bool {
        [self.low, self.high, self.lower_band, self.upper_band]
            .iter()
            .all(|v| v.is_finite())
            && self.low < self.high
            && self.lower_band <= self.upper_band
    }

    fn or_default(self) -> Self {
        if self.is_valid() {
            self
        } else {
            tracing::warn!("invalid signal bands {:?}, using defaults", self);
            Self::default()
        }
    }

    /// Above the upper band goes long, below the lower band goes short.
    pub fn classify(&self, value: f64) -> Signal {
        if value > self.upper_band {
            Signal::OpenLong
        } else if value < self.lower_band {
            Signal::OpenShort
        } else {
            Signal::Hold
        }
    }
}

/// Placeholder oscillator sampled uniformly in `[low, high)` on every decision.
pub struct RandomOscillatorSignal {
    bands: OscillatorBands,
    rng: StdRng,
}

impl RandomOscillatorSignal {
    pub fn new(bands: OscillatorBands) -> Self {
        Self::with_rng(bands, StdRng::from_os_rng())
    }

    pub fn with_seed(bands: OscillatorBands, seed: u64) -> Self {
        Self::with_rng(bands, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bands: OscillatorBands, rng: StdRng) -> Self {
        Self {
            bands: bands.or_default(),
            rng,
        }
    }
}

impl SignalEngine for RandomOscillatorSignal {
    fn signal_name(&self) -> &str {
        "random_oscillator"
    }

    fn decide(&mut self, _context: &SignalContext<'_>) -> Signal {
        let value = self.rng.random_range(self.bands.low..self.bands.high);
        tracing::debug!("oscillator value {:.2}", value);
        self.bands.classify(value)
    }
}

/// Replays a fixed sequence of decisions, then holds.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSignal {
    signals: VecDeque<Signal>,
    repeat: Option<Signal>,
}

impl ScriptedSignal {
    pub fn new(signals: impl IntoIterator<Item = Signal>) -> Self {
        Self {
            signals: signals.into_iter().collect(),
            repeat: None,
        }
    }

    /// Returns `signal` on every call.
    pub fn always(signal: Signal) -> Self {
        Self {
            signals: VecDeque::new(),
            repeat: Some(signal),
        }
    }
}

impl SignalEngine for ScriptedSignal {
    fn signal_name(&self) -> &str {
        "scripted"
    }

    fn decide(&mut self, _context: &SignalContext<'_>) -> Signal {
        self.signals
            .pop_front()
            .or(self.repeat)
            .unwrap_or(Signal::Hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SignalContext<'static> {
        SignalContext {
            price: 50000.0,
            open_positions: 0,
            trades_today: 0,
            positions: &[],
        }
    }

    #[test]
    fn test_classify_bands() {
        let bands = OscillatorBands::default();
        assert_eq!(bands.classify(60.1), Signal::OpenLong);
        assert_eq!(bands.classify(60.0), Signal::Hold);
        assert_eq!(bands.classify(50.0), Signal::Hold);
        assert_eq!(bands.classify(40.0), Signal::Hold);
        assert_eq!(bands.classify(39.9), Signal::OpenShort);
    }

    #[test]
    fn test_random_oscillator_stays_in_range() {
        let mut signal = RandomOscillatorSignal::with_seed(OscillatorBands::default(), 42);
        // same seed, same draws
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [0usize; 3];
        for _ in 0..1000 {
            let decision = signal.decide(&context());
            let value: f64 = rng.random_range(20.0..80.0);
            assert_eq!(decision, OscillatorBands::default().classify(value));
            seen[decision as usize] += 1;
        }
        // each outcome has probability 1/3
        assert!(seen.iter().all(|count| *count > 200));
    }

    #[test]
    fn test_random_oscillator_rejects_empty_range() {
        let bands = OscillatorBands {
            low: 50.0,
            high: 50.0,
            ..OscillatorBands::default()
        };
        assert!(!bands.is_valid());

        let mut signal = RandomOscillatorSignal::with_seed(bands, 3);
        assert_eq!(signal.bands, OscillatorBands::default());

        let mut rng = StdRng::seed_from_u64(3);
        let value: f64 = rng.random_range(20.0..80.0);
        assert_eq!(signal.decide(&context()), OscillatorBands::default().classify(value));
    }

    #[test]
    fn test_scripted_signal() {
        let mut signal = ScriptedSignal::new([Signal::OpenLong, Signal::OpenShort]);
        assert_eq!(signal.decide(&context()), Signal::OpenLong);
        assert_eq!(signal.decide(&context()), Signal::OpenShort);
        assert_eq!(signal.decide(&context()), Signal::Hold);

        let mut signal = ScriptedSignal::always(Signal::OpenShort);
        assert_eq!(signal.decide(&context()), Signal::OpenShort);
        assert_eq!(signal.decide(&context()), Signal::OpenShort);
    }

    #[test]
    fn test_bands_from_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(OscillatorBands::from_settings(&settings), OscillatorBands::default());
    }
}
