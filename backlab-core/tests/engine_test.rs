//! End-to-end engine scenarios over real strategies and fixed signal
//! streams.

use std::collections::BTreeMap;

use backlab_core::strategies;
use backlab_core::{Candle, ParamSpec, Signal, Simulator, Strategy};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

fn make_candles(closes: &[f64]) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            time: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        })
        .collect()
}

#[derive(Debug)]
struct Scripted(Vec<Signal>);

impl Strategy for Scripted {
    fn id(&self) -> &'static str {
        "scripted"
    }
    fn name(&self) -> &'static str {
        "Scripted"
    }
    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::new()
    }
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::new()
    }
    fn signals(&self, _candles: &[Candle]) -> Vec<Signal> {
        self.0.clone()
    }
}

#[test]
fn flat_market_never_trades() {
    let sim = Simulator::new(10_000.0, 0.001);
    let candles = make_candles(&[100.0; 10]);
    let strat = Scripted(vec![Signal::Hold; 10]);

    let report = sim.run(&candles, &strat).unwrap();
    assert_eq!(report.metrics.num_trades, 0);
    assert_eq!(report.metrics.max_drawdown, 0.0);
    assert_eq!(report.metrics.sharpe_ratio, 0.0);
    assert_eq!(report.metrics.final_capital, 10_000.0);
}

#[test]
fn single_round_trip_matches_hand_accounting() {
    let sim = Simulator::new(10_000.0, 0.001);
    let candles = make_candles(&[100.0, 100.0, 120.0]);
    let strat = Scripted(vec![Signal::Buy, Signal::Hold, Signal::Sell]);

    let report = sim.run(&candles, &strat).unwrap();

    assert_eq!(report.trades.len(), 1);
    let trade = &report.trades[0];
    assert!((trade.size - 98.901).abs() < 1e-9);
    assert!(trade.pnl.unwrap() > 0.0);
    assert_eq!(report.metrics.final_capital, 11_956.25);
}

#[test]
fn every_registered_strategy_completes_a_run() {
    let sim = Simulator::new(10_000.0, 0.001);
    // Noisy trend long enough to clear every default warmup window.
    let closes: Vec<f64> = (0..400)
        .map(|i| {
            let i = i as f64;
            100.0 + i * 0.3 + 8.0 * (i / 7.0).sin()
        })
        .collect();
    let candles = make_candles(&closes);

    for id in strategies::all_ids() {
        let strat = strategies::create(id, &BTreeMap::new()).unwrap();
        let report = sim.run(&candles, strat.as_ref()).unwrap();
        assert_eq!(report.equity_curve.len(), candles.len(), "{id}");
        assert_eq!(report.baseline_curve.len(), candles.len(), "{id}");
        assert!(report.metrics.final_capital > 0.0, "{id}");
        for trade in &report.trades {
            assert!(trade.is_closed(), "{id} left an open trade");
        }
    }
}

#[test]
fn input_candles_are_not_mutated() {
    let sim = Simulator::new(10_000.0, 0.001);
    let candles = make_candles(&[100.0, 105.0, 110.0, 108.0]);
    let before = candles.clone();
    let strat = Scripted(vec![
        Signal::Buy,
        Signal::Hold,
        Signal::Sell,
        Signal::Hold,
    ]);

    sim.run(&candles, &strat).unwrap();
    assert_eq!(candles, before);
}

proptest! {
    /// Without a Buy signal the engine never touches the cash balance.
    #[test]
    fn no_buy_means_no_trades(
        closes in prop::collection::vec(1.0_f64..10_000.0, 1..60),
        seed in any::<u64>(),
    ) {
        let candles = make_candles(&closes);
        // Arbitrary mix of Sell and Hold, never Buy.
        let signals: Vec<Signal> = (0..closes.len())
            .map(|i| {
                if (seed.wrapping_add(i as u64)) % 3 == 0 {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            })
            .collect();

        let sim = Simulator::new(10_000.0, 0.001);
        let report = sim.run(&candles, &Scripted(signals)).unwrap();

        prop_assert_eq!(report.metrics.num_trades, 0);
        prop_assert_eq!(report.metrics.final_capital, 10_000.0);
        prop_assert_eq!(report.metrics.total_return, 0.0);
    }

    /// Drawdown is a fraction of the running peak, so the reported
    /// percentage stays within [0, 100].
    #[test]
    fn drawdown_is_bounded(
        closes in prop::collection::vec(1.0_f64..10_000.0, 2..80),
    ) {
        let candles = make_candles(&closes);
        let mut signals = vec![Signal::Hold; closes.len()];
        signals[0] = Signal::Buy;

        let sim = Simulator::new(10_000.0, 0.001);
        let report = sim.run(&candles, &Scripted(signals)).unwrap();

        prop_assert!(report.metrics.max_drawdown >= 0.0);
        prop_assert!(report.metrics.max_drawdown <= 100.0);
    }

    /// Closed-trade P&L identities hold for arbitrary entry/exit prices.
    #[test]
    fn trade_pnl_identities(
        entry in 1.0_f64..5_000.0,
        exit in 1.0_f64..5_000.0,
    ) {
        let candles = make_candles(&[entry, exit]);
        let signals = vec![Signal::Buy, Signal::Sell];

        let sim = Simulator::new(10_000.0, 0.001);
        let report = sim.run(&candles, &Scripted(signals)).unwrap();

        prop_assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        let pnl = trade.pnl.unwrap();
        let pnl_pct = trade.pnl_pct.unwrap();
        prop_assert_eq!(pnl, (exit - entry) * trade.size);
        prop_assert_eq!(pnl_pct, (exit - entry) / entry);
    }
}
