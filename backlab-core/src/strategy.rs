//! Strategy capability trait and parameter declarations.
//!
//! A strategy is a pure signal generator: candle history in, one `Signal`
//! per bar out. Strategies never see cash or position state — the engine
//! owns all accounting and decides which signals are actionable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, Signal};

/// Declared range of one tunable parameter.
///
/// `default` is the value used when the caller supplies nothing; `min`,
/// `max` and `step` bound the sweepable range for the grid builder. A
/// parameter is integer-valued iff all four fields are whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamSpec {
    pub fn new(default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            default,
            min,
            max,
            step,
        }
    }

    /// Whether every declared field is a whole number.
    pub fn is_integer(&self) -> bool {
        [self.default, self.min, self.max, self.step]
            .iter()
            .all(|v| v.fract() == 0.0)
    }
}

/// Named indicator series for display overlays, aligned 1:1 with the bars.
///
/// Warmup positions hold NaN; consumers drop them before rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl IndicatorSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Capability contract every tradable strategy implements.
///
/// Implementations are stateless between calls: `signals` is a pure
/// function of the candle slice and the resolved parameters.
pub trait Strategy: std::fmt::Debug + Send + Sync {
    /// Stable machine identifier (registry key), e.g. `"sma_crossover"`.
    fn id(&self) -> &'static str;

    /// Human-readable name for listings.
    fn name(&self) -> &'static str;

    /// Declared parameter ranges, keyed by parameter name.
    fn param_specs(&self) -> BTreeMap<String, ParamSpec>;

    /// Resolved parameter values this instance was built with.
    fn params(&self) -> BTreeMap<String, f64>;

    /// One signal per input candle, same length, same order.
    ///
    /// Bars inside an indicator warmup window must yield `Hold`:
    /// comparisons against an undefined value never fire.
    fn signals(&self, candles: &[Candle]) -> Vec<Signal>;

    /// Optional indicator overlays for display. Default: none.
    fn overlays(&self, _candles: &[Candle]) -> Vec<IndicatorSeries> {
        Vec::new()
    }
}

/// Resolve one parameter: caller override if present, declared default
/// otherwise.
pub(crate) fn resolve_param(
    params: &BTreeMap<String, f64>,
    name: &str,
    default: f64,
) -> f64 {
    params.get(name).copied().unwrap_or(default)
}
