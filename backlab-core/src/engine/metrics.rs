//! Performance metrics — pure functions that compute run statistics.
//!
//! Every metric is a pure function: equity values and/or trade list in,
//! scalar out. Internal computation runs at full precision; the `Metrics`
//! snapshot is the reporting boundary where percentage metrics are scaled
//! ×100 and rounded to two decimals.

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, Trade};

/// Seconds in an average year, used to annualize the Sharpe ratio.
const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Annualization fallback when the series is too short to infer bar spacing.
const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Sentinel profit factor for a run with wins and zero losses.
pub const PROFIT_FACTOR_SENTINEL: f64 = 999.0;

/// Immutable per-run performance snapshot.
///
/// Percentage-valued fields (`total_return` through `max_drawdown`) are
/// reported ×100 and rounded to two decimals. Every field is defined for
/// every run: a zero-trade run reports zeros, never NaN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub buy_hold_return: f64,
    pub final_capital: f64,
    pub num_trades: usize,
    pub win_rate: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub profit_factor: f64,
}

impl Metrics {
    /// Derive the full snapshot from a finished run.
    ///
    /// `equity` holds the full-precision per-bar portfolio values; `candles`
    /// supply first/last closes and the timestamps used for annualization.
    pub fn compute(
        candles: &[Candle],
        trades: &[Trade],
        equity: &[f64],
        initial_capital: f64,
        final_capital: f64,
    ) -> Self {
        let total_return = (final_capital - initial_capital) / initial_capital;

        let buy_hold_return = if candles.len() >= 2 {
            let first = candles[0].close;
            let last = candles[candles.len() - 1].close;
            (last - first) / first
        } else {
            0.0
        };

        let wins: Vec<&Trade> = trades.iter().filter(|t| t.is_win()).collect();
        let losses: Vec<&Trade> = trades.iter().filter(|t| !t.is_win()).collect();

        let win_rate = if trades.is_empty() {
            0.0
        } else {
            wins.len() as f64 / trades.len() as f64
        };
        let avg_win = mean_pnl_pct(&wins);
        let avg_loss = mean_pnl_pct(&losses);

        let gross_win: f64 = wins.iter().filter_map(|t| t.pnl).sum();
        let gross_loss: f64 = losses.iter().filter_map(|t| t.pnl).sum::<f64>().abs();

        Self {
            total_return: round2(total_return * 100.0),
            buy_hold_return: round2(buy_hold_return * 100.0),
            final_capital: round2(final_capital),
            num_trades: trades.len(),
            win_rate: round2(win_rate * 100.0),
            avg_win_pct: round2(avg_win * 100.0),
            avg_loss_pct: round2(avg_loss * 100.0),
            max_drawdown: round2(max_drawdown(equity) * 100.0),
            sharpe_ratio: round2(sharpe_ratio(equity, periods_per_year(candles))),
            profit_factor: profit_factor(gross_win, gross_loss),
        }
    }
}

/// Round to two decimals. Applied only at the reporting boundary.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean_pnl_pct(trades: &[&Trade]) -> f64 {
    let pcts: Vec<f64> = trades.iter().filter_map(|t| t.pnl_pct).collect();
    if pcts.is_empty() {
        return 0.0;
    }
    pcts.iter().sum::<f64>() / pcts.len() as f64
}

/// Maximum peak-to-trough relative decline of an equity series, as a
/// fraction in `[0, 1]`. Zero for a monotonically non-decreasing curve.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &value in values {
        if value > peak {
            peak = value;
        }
        let dd = if peak > 0.0 { (peak - value) / peak } else { 0.0 };
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Annualized Sharpe ratio of per-bar percentage equity changes.
///
/// Sample standard deviation; zero when the return series has fewer than
/// two points or zero variance.
pub fn sharpe_ratio(equity: &[f64], periods_per_year: f64) -> f64 {
    let returns = bar_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
        / (returns.len() - 1) as f64;
    let std = variance.sqrt();
    if std > 0.0 {
        mean / std * periods_per_year.sqrt()
    } else {
        0.0
    }
}

/// Gross-win over gross-loss ratio with the reference asymmetry preserved:
/// both zero → 0, wins but no losses → the 999 sentinel, else the ratio.
pub fn profit_factor(gross_win: f64, gross_loss: f64) -> f64 {
    if gross_loss == 0.0 {
        if gross_win == 0.0 {
            0.0
        } else {
            PROFIT_FACTOR_SENTINEL
        }
    } else {
        round2(gross_win / gross_loss)
    }
}

/// Bars per year inferred from the average spacing of the series.
///
/// The first-to-last span is divided by the candle count, matching the
/// reference behavior for the off-by-one.
pub fn periods_per_year(candles: &[Candle]) -> f64 {
    if candles.len() < 2 {
        return DEFAULT_PERIODS_PER_YEAR;
    }
    let span = (candles[candles.len() - 1].time - candles[0].time)
        .num_seconds() as f64;
    let avg_seconds = span / candles.len() as f64;
    if avg_seconds <= 0.0 {
        return DEFAULT_PERIODS_PER_YEAR;
    }
    SECONDS_PER_YEAR / avg_seconds
}

fn bar_returns(equity: &[f64]) -> Vec<f64> {
    if equity.len() < 2 {
        return Vec::new();
    }
    equity
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}
