//! Options Sim - headless runner
//!
//! Runs the strategy engine against the Coinbase spot price and renders the
//! snapshot stream to the terminal. Commands are read from stdin:
//! `bull`, `bear`, `start`, `stop`, `pause`, `resume`, `reset`, `quit`.
//!
//! Trade inputs are edited with `set <lots|amount|sl|expiry> [value]` and take
//! effect on the next open. `save` writes the current settings to the setting file.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use options_sim::event::{EngineEvent, PriceUpdate, SnapshotReceiver};
use options_sim::gateway::CoinbasePriceSource;
use options_sim::strategy::{
    EngineConfig, OscillatorBands, RandomOscillatorSignal, SettingsTradeInputs, StrategyEngine,
    TradeInputs,
};
use options_sim::trader::{
    init_logger, Direction, PositionData, SettingValue, Settings, TradeSetting, CURRENCY, SETTINGS,
};

/// How often the view drains the snapshot channel
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logger(&SETTINGS);

    let config = EngineConfig::from_settings(&SETTINGS);
    let price_source = Arc::new(CoinbasePriceSource::from_settings(&SETTINGS)?);
    info!("pricing {} from Coinbase", price_source.currency());
    let signal = RandomOscillatorSignal::new(OscillatorBands::from_settings(&SETTINGS));
    let inputs = Arc::new(SettingsTradeInputs::new(&SETTINGS));

    let (engine, events) = StrategyEngine::spawn(config, price_source, Box::new(signal), inputs);
    info!(
        "options sim {} ready, commands: bull, bear, start, stop, pause, resume, reset, set, save, quit",
        options_sim::VERSION
    );

    // engine log lines are printed here only when tracing is not already on the console
    let show_logs = !SETTINGS.get_bool("log.console").unwrap_or(true);
    let view = tokio::spawn(render_loop(events, show_logs));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !handle_command(&engine, &SETTINGS, line.trim()).await {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("stdin closed: {}", e);
                    break;
                }
            },
        }
    }

    engine.shutdown().await;
    // the channel closes with the engine, which ends the view
    let _ = view.await;
    Ok(())
}

/// Apply one command line. Returns false when the runner should exit.
async fn handle_command(engine: &StrategyEngine, settings: &Settings, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();

    let result: Result<(), Box<dyn Error>> = match command {
        "" => Ok(()),
        "bull" | "bear" => {
            let direction = if command == "bull" { Direction::Long } else { Direction::Short };
            match SettingsTradeInputs::new(settings).trade_setting() {
                Ok(setting) => engine
                    .place_manual_trade(direction, setting)
                    .await
                    .map(|_| ())
                    .map_err(Into::into),
                Err(e) => Err(e.into()),
            }
        }
        "set" => {
            let name = parts.next().unwrap_or_default();
            let value = parts.collect::<Vec<_>>().join(" ");
            update_trade_setting(settings, name, &value)
                .map(|setting| info!("trade setting now {:?}", setting))
        }
        "save" => settings
            .save()
            .map(|path| info!("settings saved to {}", path.display())),
        "start" => engine.start().map_err(Into::into),
        "stop" => engine.stop().map_err(Into::into),
        "pause" => engine.pause().map_err(Into::into),
        "resume" => engine.resume().map_err(Into::into),
        "reset" => engine.reset().map_err(Into::into),
        "quit" | "exit" => return false,
        other => {
            warn!("unknown command {:?}", other);
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!("{} failed: {}", command, e);
    }
    !engine.is_closed()
}

/// Setting key behind a `set` command name.
fn trade_setting_key(name: &str) -> Option<&'static str> {
    match name {
        "lots" => Some("trade.lots"),
        "amount" => Some("trade.amount"),
        "sl" | "stop_loss_percent" => Some("trade.stop_loss_percent"),
        "expiry" => Some("trade.expiry"),
        _ => None,
    }
}

/// Store a raw trade input and return the setting it now resolves to.
///
/// The text is stored even when it does not parse, so the next signal open reports the error.
fn update_trade_setting(
    settings: &Settings,
    name: &str,
    value: &str,
) -> Result<TradeSetting, Box<dyn Error>> {
    let key = trade_setting_key(name)
        .ok_or_else(|| format!("unknown trade setting {:?}", name))?;
    settings.set(key, SettingValue::String(value.to_string()));
    Ok(SettingsTradeInputs::new(settings).trade_setting()?)
}

/// Drain the snapshot channel on a fixed schedule and print what arrived.
async fn render_loop(mut events: SnapshotReceiver, show_logs: bool) {
    let mut ticker = tokio::time::interval(DRAIN_INTERVAL);
    loop {
        ticker.tick().await;
        for event in events.drain() {
            match event {
                EngineEvent::Log(log) => {
                    if show_logs {
                        println!("{}", log.line());
                    }
                }
                EngineEvent::Price(update) => render_price(&update),
                EngineEvent::Positions(positions) => render_positions(&positions),
            }
        }
        if events.is_closed() {
            break;
        }
    }
}

fn render_price(update: &PriceUpdate) {
    println!(
        "{} ${:.2} | balance ${:.2} | P&L ${:.2} | trades today {}",
        CURRENCY, update.price, update.balance, update.pnl, update.trades_today
    );
}

fn render_positions(positions: &[PositionData]) {
    if positions.is_empty() {
        return;
    }
    println!(
        "{:<16} {:<5} {:>8} {:>12} {:>12} {:>12} {:<12}",
        "Symbol", "Type", "Strike", "Entry Price", "Stop-Loss", "Current P&L", "Status"
    );
    for p in positions {
        println!(
            "{:<16} {:<5} {:>8} {:>12.2} {:>12.2} {:>12.2} {:<12}",
            p.symbol,
            p.direction.to_string(),
            p.strike,
            p.entry_price,
            p.stop_loss_price,
            p.current_pnl,
            p.status.to_string()
        );
    }
}
