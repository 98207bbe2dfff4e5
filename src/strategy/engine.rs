//! Strategy Engine
//!
//! A single background task owns all engine state and is the only code that
//! mutates it. Callers talk to it through [`StrategyEngine`], which forwards
//! lifecycle commands and manual trades over a command queue. Observers read
//! copies of the state from the snapshot channel.
//!
//! Tick sequence while running and not paused:
//! fetch price (with fallback) → signal (capped) → trailing stops → snapshot.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::event::{snapshot_channel, EngineEvent, PriceUpdate, SnapshotReceiver, SnapshotSender};
use crate::trader::{
    checked_price, resolve_price, write_log, Direction, EngineError, LogData, LogLevel,
    PositionData, PriceSource, TradeSetting,
};

use super::base::{EngineConfig, EngineStatus, TradeInputs};
use super::ledger::PositionLedger;
use super::signal::{Signal, SignalContext, SignalEngine};

/// Commands accepted by the engine task
#[derive(Debug)]
enum Command {
    Start,
    Stop,
    Pause,
    Resume,
    Reset,
    ManualTrade {
        direction: Direction,
        setting: TradeSetting,
        reply: oneshot::Sender<PositionData>,
    },
}

/// Handle to a running engine task.
///
/// Dropping the handle closes the command queue, which ends the task.
pub struct StrategyEngine {
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl StrategyEngine {
    /// Spawn the engine task on the current tokio runtime.
    pub fn spawn(
        config: EngineConfig,
        price_source: Arc<dyn PriceSource>,
        signal: Box<dyn SignalEngine>,
        inputs: Arc<dyn TradeInputs>,
    ) -> (Self, SnapshotReceiver) {
        let ledger = PositionLedger::new(config.initial_balance);
        Self::spawn_with_ledger(config, ledger, price_source, signal, inputs)
    }

    /// Spawn the engine task with a prepared ledger.
    pub fn spawn_with_ledger(
        config: EngineConfig,
        ledger: PositionLedger,
        price_source: Arc<dyn PriceSource>,
        signal: Box<dyn SignalEngine>,
        inputs: Arc<dyn TradeInputs>,
    ) -> (Self, SnapshotReceiver) {
        let (events, receiver) = snapshot_channel(config.channel_capacity);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let core = EngineCore::new(config, ledger, price_source, signal, inputs, events);
        let task = tokio::spawn(core.run(command_rx, cancel.clone()));

        let engine = Self {
            commands,
            cancel,
            task,
        };
        (engine, receiver)
    }

    fn send(&self, command: Command) -> Result<(), EngineError> {
        self.commands.send(command).map_err(|_| EngineError::Closed)
    }

    /// Begin ticking. No-op when already running.
    pub fn start(&self) -> Result<(), EngineError> {
        self.send(Command::Start)
    }

    /// Stop ticking after the current tick.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.send(Command::Stop)
    }

    /// Keep the timer running but skip all work on each tick.
    pub fn pause(&self) -> Result<(), EngineError> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> Result<(), EngineError> {
        self.send(Command::Resume)
    }

    /// Stop, clear every position and counter, and publish one snapshot.
    pub fn reset(&self) -> Result<(), EngineError> {
        self.send(Command::Reset)
    }

    /// Open a position at the current price regardless of the signal caps.
    ///
    /// Starts the engine when it is idle. A malformed setting is rejected here,
    /// before anything reaches the engine task.
    pub async fn place_manual_trade(
        &self,
        direction: Direction,
        setting: TradeSetting,
    ) -> Result<PositionData, EngineError> {
        setting.validate()?;

        let (reply, response) = oneshot::channel();
        self.send(Command::ManualTrade {
            direction,
            setting,
            reply,
        })?;
        response.await.map_err(|_| EngineError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Cancel the task and wait for it to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!("strategy engine task failed: {}", e);
        }
    }
}

/// Mutable state of the strategy loop.
struct EngineState {
    running: bool,
    paused: bool,
    last_price: Option<f64>,
    ledger: PositionLedger,
}

/// The engine task.
struct EngineCore {
    config: EngineConfig,
    state: EngineState,
    price_source: Arc<dyn PriceSource>,
    signal: Box<dyn SignalEngine>,
    inputs: Arc<dyn TradeInputs>,
    events: SnapshotSender,
}

impl EngineCore {
    fn new(
        config: EngineConfig,
        ledger: PositionLedger,
        price_source: Arc<dyn PriceSource>,
        signal: Box<dyn SignalEngine>,
        inputs: Arc<dyn TradeInputs>,
        events: SnapshotSender,
    ) -> Self {
        Self {
            config,
            state: EngineState {
                running: false,
                paused: false,
                last_price: None,
                ledger,
            },
            price_source,
            signal,
            inputs,
            events,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>, cancel: CancellationToken) {
        tracing::debug!(
            "strategy engine task started: source={} signal={}",
            self.price_source.source_name(),
            self.signal.signal_name()
        );

        let mut ticker: Option<Interval> = None;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                _ = next_tick(&mut ticker) => self.on_tick().await,
            }

            // the timer exists exactly while the loop is running
            match (self.state.running, ticker.is_some()) {
                (true, false) => {
                    let mut interval = time::interval(self.config.tick_interval);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    ticker = Some(interval);
                }
                (false, true) => ticker = None,
                _ => {}
            }
        }

        tracing::debug!("strategy engine task stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Reset => self.reset(),
            Command::ManualTrade {
                direction,
                setting,
                reply,
            } => {
                let position = self.place_manual_trade(direction, &setting).await;
                // caller may have given up waiting
                let _ = reply.send(position);
            }
        }
    }

    fn status(&self) -> EngineStatus {
        EngineStatus::from_flags(self.state.running, self.state.paused)
    }

    fn start(&mut self) {
        if self.state.running {
            return;
        }
        self.state.running = true;
        self.state.paused = false;
        self.log(LogLevel::Info, "Trading bot initialized");
    }

    fn stop(&mut self) {
        if self.state.running {
            self.log(LogLevel::Info, "Trading bot stopped");
        }
        self.state.running = false;
        self.state.paused = false;
    }

    fn pause(&mut self) {
        if self.status() == EngineStatus::Running {
            self.state.paused = true;
            self.log(LogLevel::Info, "Trading bot paused");
        }
    }

    fn resume(&mut self) {
        if self.status() == EngineStatus::Paused {
            self.state.paused = false;
            self.log(LogLevel::Info, "Trading bot resumed");
        }
    }

    fn reset(&mut self) {
        self.stop();
        self.state.ledger.reset();
        let price = self.state.last_price.unwrap_or(self.config.fallback_price);
        self.publish_snapshot(price);
    }

    /// One pass of the strategy loop.
    async fn on_tick(&mut self) {
        if self.status() != EngineStatus::Running {
            return;
        }

        let price = self.fetch_price().await;

        if self.state.ledger.open_count() < self.config.max_open_positions
            && self.state.ledger.trades_today() < self.config.max_trades_per_session
        {
            self.run_signal(price);
        }

        for position in self.state.ledger.mark(price) {
            self.log(
                LogLevel::Warning,
                format!(
                    "{} trade hit stop-loss at ${:.2} and was closed",
                    position.direction, price
                ),
            );
        }

        self.publish_snapshot(price);
    }

    fn run_signal(&mut self, price: f64) {
        let ledger = &self.state.ledger;
        let context = SignalContext {
            price,
            open_positions: ledger.open_count(),
            trades_today: ledger.trades_today(),
            positions: ledger.positions(),
        };
        let direction = match self.signal.decide(&context) {
            Signal::OpenLong => Direction::Long,
            Signal::OpenShort => Direction::Short,
            Signal::Hold => return,
        };

        let setting = self
            .inputs
            .trade_setting()
            .and_then(|setting| setting.validate().map(|()| setting));
        match setting {
            Ok(setting) => {
                self.open_position(direction, price, &setting);
            }
            Err(e) => self.log(
                LogLevel::Error,
                format!("{} signal skipped, invalid trade setting: {}", direction, e),
            ),
        }
    }

    async fn place_manual_trade(&mut self, direction: Direction, setting: &TradeSetting) -> PositionData {
        self.start();
        let price = self.fetch_price().await;
        let position = self.open_position(direction, price, setting);
        self.publish_snapshot(price);
        position
    }

    fn open_position(&mut self, direction: Direction, price: f64, setting: &TradeSetting) -> PositionData {
        let lots = setting.resolve_lots(price);
        let position = self
            .state
            .ledger
            .open(direction, price, lots, setting.stop_loss_percent);
        self.log(
            LogLevel::Info,
            format!(
                "{} trade placed at ${:.2} with {:.4} lots | SL: {}%",
                direction, price, lots, setting.stop_loss_percent
            ),
        );
        position
    }

    /// Current price, falling back to the last known one and then to the configured default.
    async fn fetch_price(&mut self) -> f64 {
        let fetched = self.price_source.fetch().await.and_then(checked_price);
        let price = resolve_price(&fetched, self.state.last_price, self.config.fallback_price);
        if let Err(e) = &fetched {
            self.log(
                LogLevel::Warning,
                format!("Price feed unavailable ({}), using ${:.2}", e, price),
            );
        }
        self.state.last_price = Some(price);
        price
    }

    fn publish_snapshot(&self, price: f64) {
        let ledger = &self.state.ledger;
        let update = PriceUpdate {
            price,
            balance: ledger.balance(),
            pnl: ledger.pnl(),
            trades_today: ledger.trades_today(),
        };
        self.events.publish_snapshot(update, ledger.positions().to_vec());
    }

    fn log(&self, level: LogLevel, msg: impl Into<String>) {
        let log = LogData::new(level, msg);
        write_log(&log);
        self.events.publish(EngineEvent::Log(log));
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
