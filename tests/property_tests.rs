//! Property tests for position invariants.
//!
//! Uses proptest to verify:
//! 1. Ratchet monotonicity: long stops never fall, short stops never rise
//! 2. Frozen closes: a closed position never changes again
//! 3. P&L formula: open positions are marked at the latest price
//! 4. Reset idempotence: resetting twice equals resetting once

use options_sim::strategy::stop_loss::{evaluate, Evaluation};
use options_sim::strategy::PositionLedger;
use options_sim::trader::{Direction, PositionData};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (10_000.0..90_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_path() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), 1..60)
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Long), Just(Direction::Short)]
}

fn arb_percent() -> impl Strategy<Value = f64> {
    0.1..20.0_f64
}

fn arb_lots() -> impl Strategy<Value = f64> {
    0.001..50.0_f64
}

// ── 1. Ratchet Monotonicity ──────────────────────────────────────────

proptest! {
    #[test]
    fn stop_only_tightens(
        direction in arb_direction(),
        entry in arb_price(),
        pct in arb_percent(),
        path in arb_path(),
    ) {
        let mut pos = PositionData::new(1, direction, entry, entry, 1.0, pct);
        let mut previous = pos.stop_loss_price;

        for price in path {
            evaluate(&mut pos, price);
            match direction {
                Direction::Long => prop_assert!(pos.stop_loss_price >= previous),
                Direction::Short => prop_assert!(pos.stop_loss_price <= previous),
            }
            previous = pos.stop_loss_price;
        }
    }

    /// The extreme price only moves in the favorable direction.
    #[test]
    fn extreme_is_monotonic(
        direction in arb_direction(),
        entry in arb_price(),
        path in arb_path(),
    ) {
        let mut pos = PositionData::new(1, direction, entry, entry, 1.0, 2.0);
        let mut previous = pos.extreme_price;

        for price in path {
            evaluate(&mut pos, price);
            match direction {
                Direction::Long => prop_assert!(pos.extreme_price >= previous),
                Direction::Short => prop_assert!(pos.extreme_price <= previous),
            }
            previous = pos.extreme_price;
        }
    }
}

// ── 2. Frozen Closes ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn closed_position_never_changes(
        direction in arb_direction(),
        entry in arb_price(),
        pct in arb_percent(),
        path in arb_path(),
    ) {
        let mut pos = PositionData::new(1, direction, entry, entry, 2.0, pct);
        let mut frozen: Option<PositionData> = None;

        for price in path {
            let result = evaluate(&mut pos, price);
            match &frozen {
                Some(closed) => {
                    prop_assert_eq!(result, Evaluation::Skipped);
                    prop_assert_eq!(&pos, closed);
                }
                None if !pos.is_open() => {
                    prop_assert_eq!(pos.exit_price, Some(price));
                    frozen = Some(pos.clone());
                }
                None => {}
            }
        }
    }
}

// ── 3. P&L Formula ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn open_pnl_matches_direction_formula(
        direction in arb_direction(),
        entry in arb_price(),
        lots in arb_lots(),
        path in arb_path(),
    ) {
        let mut pos = PositionData::new(1, direction, entry, entry, lots, 5.0);

        for price in path {
            let was_open = pos.is_open();
            evaluate(&mut pos, price);
            if was_open {
                let expected = match direction {
                    Direction::Long => (price - entry) * lots,
                    Direction::Short => (entry - price) * lots,
                };
                prop_assert!((pos.current_pnl - expected).abs() < 1e-6);
            }
        }
    }
}

// ── 4. Reset Idempotence ─────────────────────────────────────────────

proptest! {
    #[test]
    fn reset_twice_equals_reset_once(
        initial_balance in 0.0..100_000.0_f64,
        opens in prop::collection::vec((arb_direction(), arb_price()), 0..12),
        marks in prop::collection::vec(arb_price(), 0..12),
    ) {
        let mut ledger = PositionLedger::with_seed(initial_balance, 17);
        for (direction, price) in opens {
            ledger.open(direction, price, 1.0, 2.0);
        }
        for price in marks {
            ledger.mark(price);
        }

        ledger.reset();
        let once = (
            ledger.positions().to_vec(),
            ledger.trades_today(),
            ledger.open_count(),
            ledger.balance(),
            ledger.pnl(),
        );
        ledger.reset();
        let twice = (
            ledger.positions().to_vec(),
            ledger.trades_today(),
            ledger.open_count(),
            ledger.balance(),
            ledger.pnl(),
        );

        prop_assert_eq!(&once, &twice);
        prop_assert!(once.0.is_empty());
        prop_assert_eq!(once.3, initial_balance);
    }
}
