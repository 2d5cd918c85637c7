//! Domain types shared across the engine and the search layer.

pub mod candle;
pub mod equity;
pub mod signal;
pub mod trade;

pub use candle::{validate_candles, Candle, CandleError};
pub use equity::EquityPoint;
pub use signal::Signal;
pub use trade::Trade;
