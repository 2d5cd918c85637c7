//! RSI mean reversion — oversold/overbought threshold crosses.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::indicators::rsi;
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

/// Buy when RSI crosses up through the oversold level, sell when it crosses
/// down through the overbought level.
#[derive(Debug, Clone)]
pub struct RsiStrategy {
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl RsiStrategy {
    pub const ID: &'static str = "rsi";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            period: resolve_param(params, "period", 14.0) as usize,
            oversold: resolve_param(params, "oversold", 30.0),
            overbought: resolve_param(params, "overbought", 70.0),
        }
    }
}

impl Default for RsiStrategy {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for RsiStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "RSI Mean Reversion"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([
            ("period".to_string(), ParamSpec::new(14.0, 2.0, 50.0, 1.0)),
            ("oversold".to_string(), ParamSpec::new(30.0, 10.0, 45.0, 1.0)),
            ("overbought".to_string(), ParamSpec::new(70.0, 55.0, 90.0, 1.0)),
        ])
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("period".to_string(), self.period as f64),
            ("oversold".to_string(), self.oversold),
            ("overbought".to_string(), self.overbought),
        ])
    }

    fn signals(&self, candles: &[Candle]) -> Vec<Signal> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let rsi = rsi(&closes, self.period);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                if rsi[i] < self.overbought && rsi[i - 1] >= self.overbought {
                    Signal::Sell
                } else if rsi[i] > self.oversold && rsi[i - 1] <= self.oversold {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            })
            .collect()
    }

    fn overlays(&self, candles: &[Candle]) -> Vec<IndicatorSeries> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        vec![IndicatorSeries::new(
            format!("rsi_{}", self.period),
            rsi(&closes, self.period),
        )]
    }
}
