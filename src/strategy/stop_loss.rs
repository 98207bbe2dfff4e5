//! Trailing stop-loss evaluation.
//!
//! Per open position and price `p`, in this order:
//! 1. mark `current_pnl` at `p`;
//! 2. on a new favorable extreme, move the extreme to `p` and ratchet the stop
//!    toward `p` (longs only up, shorts only down);
//! 3. close the position when `p` reaches the stop.
//!
//! Step 2 runs before step 3, so a stop can move and fire on the same price.

use crate::trader::{stop_price_from, Direction, PositionData};

/// Result of evaluating one position against one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Position was already closed; nothing changed
    Skipped,
    /// Stop unchanged, position still open
    Held,
    /// Stop tightened, position still open
    Ratcheted,
    /// Stop reached and position closed
    Triggered { ratcheted: bool },
}

/// Evaluate a single position at `price`.
pub fn evaluate(position: &mut PositionData, price: f64) -> Evaluation {
    if !position.is_open() {
        return Evaluation::Skipped;
    }

    position.current_pnl = position.pnl_at(price);
    let ratcheted = ratchet(position, price);

    if is_triggered(position.direction, price, position.stop_loss_price) {
        position.close(price);
        Evaluation::Triggered { ratcheted }
    } else if ratcheted {
        Evaluation::Ratcheted
    } else {
        Evaluation::Held
    }
}

/// Evaluate every open position, returning copies of the ones that closed.
pub fn evaluate_all(positions: &mut [PositionData], price: f64) -> Vec<PositionData> {
    positions
        .iter_mut()
        .filter_map(|position| match evaluate(position, price) {
            Evaluation::Triggered { .. } => Some(position.clone()),
            _ => None,
        })
        .collect()
}

fn ratchet(position: &mut PositionData, price: f64) -> bool {
    let candidate = stop_price_from(position.direction, price, position.stop_loss_percent);
    let previous = position.stop_loss_price;

    match position.direction {
        Direction::Long if price > position.extreme_price => {
            position.extreme_price = price;
            position.stop_loss_price = previous.max(candidate);
        }
        Direction::Short if price < position.extreme_price => {
            position.extreme_price = price;
            position.stop_loss_price = previous.min(candidate);
        }
        _ => return false,
    }

    position.stop_loss_price != previous
}

fn is_triggered(direction: Direction, price: f64, stop: f64) -> bool {
    match direction {
        Direction::Long => price <= stop,
        Direction::Short => price >= stop,
    }
}
