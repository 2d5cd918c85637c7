//! MACD crossover — MACD line against its signal line.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::indicators::ema;
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

/// Buy when the MACD line crosses above its signal line, sell when it
/// crosses below.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl Macd {
    pub const ID: &'static str = "macd";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            fast: resolve_param(params, "fast", 12.0) as usize,
            slow: resolve_param(params, "slow", 26.0) as usize,
            signal: resolve_param(params, "signal", 9.0) as usize,
        }
    }

    fn macd_lines(&self, closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let fast = ema(closes, self.fast);
        let slow = ema(closes, self.slow);
        let macd: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal = ema(&macd, self.signal);
        (macd, signal)
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for Macd {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "MACD Crossover"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([
            ("fast".to_string(), ParamSpec::new(12.0, 2.0, 50.0, 1.0)),
            ("slow".to_string(), ParamSpec::new(26.0, 5.0, 200.0, 1.0)),
            ("signal".to_string(), ParamSpec::new(9.0, 2.0, 50.0, 1.0)),
        ])
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("fast".to_string(), self.fast as f64),
            ("slow".to_string(), self.slow as f64),
            ("signal".to_string(), self.signal as f64),
        ])
    }

    fn signals(&self, candles: &[Candle]) -> Vec<Signal> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (macd, signal) = self.macd_lines(&closes);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                if macd[i] < signal[i] && macd[i - 1] >= signal[i - 1] {
                    Signal::Sell
                } else if macd[i] > signal[i] && macd[i - 1] <= signal[i - 1] {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            })
            .collect()
    }

    fn overlays(&self, candles: &[Candle]) -> Vec<IndicatorSeries> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (macd, signal) = self.macd_lines(&closes);
        let hist: Vec<f64> = macd.iter().zip(signal.iter()).map(|(m, s)| m - s).collect();
        vec![
            IndicatorSeries::new("macd", macd),
            IndicatorSeries::new("macd_signal", signal),
            IndicatorSeries::new("macd_hist", hist),
        ]
    }
}
