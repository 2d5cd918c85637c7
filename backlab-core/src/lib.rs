//! BackLab Core — domain types, simulation engine and strategy library.
//!
//! This crate contains the heart of the backtesting lab:
//! - Domain types (candles, signals, trades, equity points)
//! - Candle validation (monotonic time, finite fields)
//! - Event-driven long-only backtest loop with cash/position accounting
//! - Performance metrics (return, drawdown, Sharpe, profit factor)
//! - The `Strategy` capability trait and parameter declarations
//! - Indicator math helpers and nine built-in strategies

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategies;
pub mod strategy;

pub use domain::{validate_candles, Candle, CandleError, EquityPoint, Signal, Trade};
pub use engine::{EngineError, Metrics, RunReport, Simulator};
pub use strategy::{IndicatorSeries, ParamSpec, Strategy};
