//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for a single fixed time interval.
///
/// Candle sequences are ordered by time ascending with no duplicate
/// timestamps. Gaps between candles are tolerated — the engine never assumes
/// a fixed bar spacing except when annualizing, where the average spacing is
/// derived from the series itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Structural defects in a candle series.
///
/// These are upstream/data errors: the supplier handed us a malformed series
/// and the engine refuses to start rather than silently coerce.
#[derive(Debug, Error, PartialEq)]
pub enum CandleError {
    #[error("candle {index}: non-finite {field} value")]
    NonFiniteField { index: usize, field: &'static str },
    #[error("candle {index}: close must be positive, got {close}")]
    NonPositiveClose { index: usize, close: f64 },
    #[error("candle {index}: timestamp does not advance past candle {}", index - 1)]
    NonMonotonicTime { index: usize },
}

/// Validate a candle series before simulation.
///
/// Checks every OHLCV field for finiteness, requires a positive close (the
/// engine divides by it), and requires strictly ascending timestamps. The
/// first defect found is returned; an empty series is valid.
pub fn validate_candles(candles: &[Candle]) -> Result<(), CandleError> {
    for (index, candle) in candles.iter().enumerate() {
        for (field, value) in [
            ("open", candle.open),
            ("high", candle.high),
            ("low", candle.low),
            ("close", candle.close),
            ("volume", candle.volume),
        ] {
            if !value.is_finite() {
                return Err(CandleError::NonFiniteField { index, field });
            }
        }
        if candle.close <= 0.0 {
            return Err(CandleError::NonPositiveClose {
                index,
                close: candle.close,
            });
        }
        if index > 0 && candle.time <= candles[index - 1].time {
            return Err(CandleError::NonMonotonicTime { index });
        }
    }
    Ok(())
}
