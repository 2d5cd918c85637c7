//! Simulation engine: the backtest loop and its performance metrics.

pub mod metrics;
pub mod simulator;

pub use metrics::{Metrics, PROFIT_FACTOR_SENTINEL};
pub use simulator::{EngineError, RunReport, Simulator, CASH_RESERVE_FRACTION};
