//! Event-driven backtest loop — cash and position accounting.
//!
//! Single asset, single position, long only. The simulator owns all money
//! state; strategies only ever see candles. One instance can serve many
//! runs — nothing is carried between invocations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::{validate_candles, Candle, CandleError, EquityPoint, Signal, Trade};
use crate::engine::metrics::Metrics;
use crate::strategy::Strategy;

/// Fraction of cash held back on every entry. The buffer emulates a
/// realistic non-100% allocation and is never invested.
pub const CASH_RESERVE_FRACTION: f64 = 0.01;

/// Simulation failure, raised before any bar is processed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Candle(#[from] CandleError),
    #[error("initial capital must be positive, got {capital}")]
    NonPositiveCapital { capital: f64 },
    #[error("commission rate must be non-negative, got {rate}")]
    NegativeCommission { rate: f64 },
    #[error("strategy produced {signals} signals for {bars} bars")]
    SignalLengthMismatch { bars: usize, signals: usize },
}

/// Full result of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub strategy_id: String,
    pub params: BTreeMap<String, f64>,
    pub metrics: Metrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub baseline_curve: Vec<EquityPoint>,
}

/// Backtest engine configured with starting cash and a symmetric
/// commission rate (fraction of notional on entry and exit).
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    pub initial_capital: f64,
    pub commission_rate: f64,
}

impl Simulator {
    pub fn new(initial_capital: f64, commission_rate: f64) -> Self {
        Self {
            initial_capital,
            commission_rate,
        }
    }

    /// Run a full backtest, returning trades, curves and metrics.
    ///
    /// Empty candle input yields a zero-trade, zero-return report.
    /// Malformed candles or a signal-count mismatch fail fast before any
    /// accounting happens.
    pub fn run(
        &self,
        candles: &[Candle],
        strategy: &dyn Strategy,
    ) -> Result<RunReport, EngineError> {
        self.validate(candles)?;

        if candles.is_empty() {
            return Ok(RunReport {
                strategy_id: strategy.id().to_string(),
                params: strategy.params(),
                metrics: Metrics::compute(
                    candles,
                    &[],
                    &[],
                    self.initial_capital,
                    self.initial_capital,
                ),
                trades: Vec::new(),
                equity_curve: Vec::new(),
                baseline_curve: Vec::new(),
            });
        }

        let signals = strategy.signals(candles);
        if signals.len() != candles.len() {
            return Err(EngineError::SignalLengthMismatch {
                bars: candles.len(),
                signals: signals.len(),
            });
        }

        let mut cash = self.initial_capital;
        let mut position = 0.0_f64;
        let mut open_trade: Option<Trade> = None;
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity: Vec<f64> = Vec::with_capacity(candles.len());
        let mut equity_curve = Vec::with_capacity(candles.len());
        let mut baseline_curve = Vec::with_capacity(candles.len());
        let baseline_shares = self.initial_capital / candles[0].close;

        for (candle, signal) in candles.iter().zip(signals.iter()) {
            let price = candle.close;

            // Mark to market before acting on this bar's signal.
            let portfolio_value = cash + position * price;
            equity.push(portfolio_value);
            equity_curve.push(EquityPoint {
                time: candle.time,
                value: portfolio_value,
            });
            baseline_curve.push(EquityPoint {
                time: candle.time,
                value: baseline_shares * price,
            });

            match signal {
                Signal::Buy if position == 0.0 => {
                    let invest = cash * (1.0 - CASH_RESERVE_FRACTION);
                    let fee = invest * self.commission_rate;
                    position = (invest - fee) / price;
                    cash -= invest;
                    open_trade = Some(Trade::open(candle.time, price, position));
                }
                Signal::Sell if position > 0.0 => {
                    let proceeds = position * price;
                    let fee = proceeds * self.commission_rate;
                    cash += proceeds - fee;
                    if let Some(mut trade) = open_trade.take() {
                        trade.close(candle.time, price);
                        trades.push(trade);
                    }
                    position = 0.0;
                }
                _ => {}
            }
        }

        // Never end a run holding an unrealized position.
        if position > 0.0 {
            let last = &candles[candles.len() - 1];
            let proceeds = position * last.close;
            let fee = proceeds * self.commission_rate;
            cash += proceeds - fee;
            if let Some(mut trade) = open_trade.take() {
                trade.close(last.time, last.close);
                trades.push(trade);
            }
        }

        let metrics =
            Metrics::compute(candles, &trades, &equity, self.initial_capital, cash);

        Ok(RunReport {
            strategy_id: strategy.id().to_string(),
            params: strategy.params(),
            metrics,
            trades,
            equity_curve,
            baseline_curve,
        })
    }

    /// Summary mode for sweeps: same simulation, curves dropped after
    /// metric derivation to bound memory.
    pub fn run_summary(
        &self,
        candles: &[Candle],
        strategy: &dyn Strategy,
    ) -> Result<Metrics, EngineError> {
        self.run(candles, strategy).map(|report| report.metrics)
    }

    fn validate(&self, candles: &[Candle]) -> Result<(), EngineError> {
        if self.initial_capital <= 0.0 || !self.initial_capital.is_finite() {
            return Err(EngineError::NonPositiveCapital {
                capital: self.initial_capital,
            });
        }
        if self.commission_rate < 0.0 || !self.commission_rate.is_finite() {
            return Err(EngineError::NegativeCommission {
                rate: self.commission_rate,
            });
        }
        validate_candles(candles)?;
        Ok(())
    }
}
