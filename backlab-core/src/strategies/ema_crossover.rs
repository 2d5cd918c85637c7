//! EMA crossover — exponential variant of the moving-average cross.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::indicators::ema;
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

/// Buy when the fast EMA crosses above the slow EMA, sell when it crosses
/// below. Reacts faster to price changes than the SMA variant.
#[derive(Debug, Clone)]
pub struct EmaCrossover {
    fast_period: usize,
    slow_period: usize,
}

impl EmaCrossover {
    pub const ID: &'static str = "ema_crossover";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            fast_period: resolve_param(params, "fast_period", 12.0) as usize,
            slow_period: resolve_param(params, "slow_period", 26.0) as usize,
        }
    }
}

impl Default for EmaCrossover {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for EmaCrossover {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "EMA Crossover"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([
            ("fast_period".to_string(), ParamSpec::new(12.0, 2.0, 100.0, 1.0)),
            ("slow_period".to_string(), ParamSpec::new(26.0, 5.0, 300.0, 1.0)),
        ])
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("fast_period".to_string(), self.fast_period as f64),
            ("slow_period".to_string(), self.slow_period as f64),
        ])
    }

    fn signals(&self, candles: &[Candle]) -> Vec<Signal> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let fast = ema(&closes, self.fast_period);
        let slow = ema(&closes, self.slow_period);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                if fast[i] < slow[i] && fast[i - 1] >= slow[i - 1] {
                    Signal::Sell
                } else if fast[i] > slow[i] && fast[i - 1] <= slow[i - 1] {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            })
            .collect()
    }

    fn overlays(&self, candles: &[Candle]) -> Vec<IndicatorSeries> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        vec![
            IndicatorSeries::new(
                format!("ema_{}", self.fast_period),
                ema(&closes, self.fast_period),
            ),
            IndicatorSeries::new(
                format!("ema_{}", self.slow_period),
                ema(&closes, self.slow_period),
            ),
        ]
    }
}
