//! Position ledger: the positions of one session and their accounting.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::trader::{strike_from, Direction, PositionData};

use super::stop_loss;

/// Owns every position of the session, the trade counter and the balance figures.
#[derive(Debug, Clone)]
pub struct PositionLedger {
    positions: Vec<PositionData>,
    trades_today: u32,
    next_id: u64,
    initial_balance: f64,
    balance: f64,
    pnl: f64,
    /// Picks the strike offset
    rng: StdRng,
}

impl PositionLedger {
    pub fn new(initial_balance: f64) -> Self {
        Self::with_rng(initial_balance, StdRng::from_os_rng())
    }

    /// Ledger with reproducible strike selection.
    pub fn with_seed(initial_balance: f64, seed: u64) -> Self {
        Self::with_rng(initial_balance, StdRng::seed_from_u64(seed))
    }

    fn with_rng(initial_balance: f64, rng: StdRng) -> Self {
        Self {
            positions: Vec::new(),
            trades_today: 0,
            next_id: 0,
            initial_balance,
            balance: initial_balance,
            pnl: 0.0,
            rng,
        }
    }

    /// Open a position at `entry_price` and return a copy of it.
    ///
    /// Sizes are not validated here; callers pass positive values.
    pub fn open(
        &mut self,
        direction: Direction,
        entry_price: f64,
        lots: f64,
        stop_loss_percent: f64,
    ) -> PositionData {
        self.next_id += 1;
        let strike = strike_from(entry_price, self.rng.random_range(-1..=1));
        let position = PositionData::new(
            self.next_id,
            direction,
            strike,
            entry_price,
            lots,
            stop_loss_percent,
        );

        self.positions.push(position.clone());
        self.trades_today += 1;
        position
    }

    /// Run the trailing stop over every open position at `price`, then refresh
    /// the account figures. Returns copies of the positions closed by this pass.
    pub fn mark(&mut self, price: f64) -> Vec<PositionData> {
        let closed = stop_loss::evaluate_all(&mut self.positions, price);
        self.update_account();
        closed
    }

    /// `pnl` sums every position; `balance` books the closed ones.
    fn update_account(&mut self) {
        let (realized, unrealized) =
            self.positions
                .iter()
                .fold((0.0, 0.0), |(realized, unrealized), position| {
                    if position.is_open() {
                        (realized, unrealized + position.current_pnl)
                    } else {
                        (realized + position.current_pnl, unrealized)
                    }
                });
        self.balance = self.initial_balance + realized;
        self.pnl = realized + unrealized;
    }

    /// Clear positions and counters and restore the initial balance.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.trades_today = 0;
        self.next_id = 0;
        self.balance = self.initial_balance;
        self.pnl = 0.0;
    }

    pub fn open_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_open()).count()
    }

    pub fn positions(&self) -> &[PositionData] {
        &self.positions
    }

    pub fn trades_today(&self) -> u32 {
        self.trades_today
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn pnl(&self) -> f64 {
        self.pnl
    }
}
