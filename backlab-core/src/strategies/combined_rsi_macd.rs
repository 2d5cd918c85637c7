//! RSI + MACD combination — momentum crosses gated by trend agreement.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::indicators::{ema, rsi};
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

/// Buy when RSI recovers up through its oversold level while MACD is above
/// its signal line; sell when RSI drops through its overbought level or
/// MACD crosses below its signal line.
#[derive(Debug, Clone)]
pub struct CombinedRsiMacd {
    rsi_period: usize,
    rsi_oversold: f64,
    rsi_overbought: f64,
    macd_fast: usize,
    macd_slow: usize,
    macd_signal: usize,
}

impl CombinedRsiMacd {
    pub const ID: &'static str = "combined_rsi_macd";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            rsi_period: resolve_param(params, "rsi_period", 14.0) as usize,
            rsi_oversold: resolve_param(params, "rsi_oversold", 40.0),
            rsi_overbought: resolve_param(params, "rsi_overbought", 60.0),
            macd_fast: resolve_param(params, "macd_fast", 12.0) as usize,
            macd_slow: resolve_param(params, "macd_slow", 26.0) as usize,
            macd_signal: resolve_param(params, "macd_signal", 9.0) as usize,
        }
    }

    fn lines(&self, closes: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let rsi = rsi(closes, self.rsi_period);
        let fast = ema(closes, self.macd_fast);
        let slow = ema(closes, self.macd_slow);
        let macd: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal = ema(&macd, self.macd_signal);
        (rsi, macd, signal)
    }
}

impl Default for CombinedRsiMacd {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for CombinedRsiMacd {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "RSI + MACD Combined"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([
            ("rsi_period".to_string(), ParamSpec::new(14.0, 5.0, 50.0, 1.0)),
            ("rsi_oversold".to_string(), ParamSpec::new(40.0, 20.0, 50.0, 1.0)),
            ("rsi_overbought".to_string(), ParamSpec::new(60.0, 50.0, 80.0, 1.0)),
            ("macd_fast".to_string(), ParamSpec::new(12.0, 5.0, 30.0, 1.0)),
            ("macd_slow".to_string(), ParamSpec::new(26.0, 10.0, 60.0, 1.0)),
            ("macd_signal".to_string(), ParamSpec::new(9.0, 3.0, 20.0, 1.0)),
        ])
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("rsi_period".to_string(), self.rsi_period as f64),
            ("rsi_oversold".to_string(), self.rsi_oversold),
            ("rsi_overbought".to_string(), self.rsi_overbought),
            ("macd_fast".to_string(), self.macd_fast as f64),
            ("macd_slow".to_string(), self.macd_slow as f64),
            ("macd_signal".to_string(), self.macd_signal as f64),
        ])
    }

    fn signals(&self, candles: &[Candle]) -> Vec<Signal> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (rsi, macd, signal) = self.lines(&closes);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                // A bar matching both rules sells.
                let sell = (rsi[i] < self.rsi_overbought
                    && rsi[i - 1] >= self.rsi_overbought)
                    || (macd[i] < signal[i] && macd[i - 1] >= signal[i - 1]);
                let buy = rsi[i] > self.rsi_oversold
                    && rsi[i - 1] <= self.rsi_oversold
                    && macd[i] > signal[i];
                if sell {
                    Signal::Sell
                } else if buy {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            })
            .collect()
    }

    fn overlays(&self, candles: &[Candle]) -> Vec<IndicatorSeries> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (rsi, macd, signal) = self.lines(&closes);
        vec![
            IndicatorSeries::new(format!("rsi_{}", self.rsi_period), rsi),
            IndicatorSeries::new("macd", macd),
            IndicatorSeries::new("macd_signal", signal),
        ]
    }
}
