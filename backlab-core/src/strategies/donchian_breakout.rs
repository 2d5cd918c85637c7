//! Donchian channel breakout.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::indicators::{rolling_max, rolling_min};
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

/// Buy when the bar's high breaks the previous N-period high, sell when the
/// low breaks the previous N-period low. When a wide bar does both at once
/// the breakdown wins.
#[derive(Debug, Clone)]
pub struct DonchianBreakout {
    period: usize,
}

impl DonchianBreakout {
    pub const ID: &'static str = "donchian_breakout";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            period: resolve_param(params, "period", 20.0) as usize,
        }
    }
}

impl Default for DonchianBreakout {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for DonchianBreakout {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Donchian Channel Breakout"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([(
            "period".to_string(),
            ParamSpec::new(20.0, 5.0, 100.0, 1.0),
        )])
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([("period".to_string(), self.period as f64)])
    }

    fn signals(&self, candles: &[Candle]) -> Vec<Signal> {
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let channel_high = rolling_max(&highs, self.period);
        let channel_low = rolling_min(&lows, self.period);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                if lows[i] < channel_low[i - 1] {
                    Signal::Sell
                } else if highs[i] > channel_high[i - 1] {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            })
            .collect()
    }

    fn overlays(&self, candles: &[Candle]) -> Vec<IndicatorSeries> {
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        vec![
            IndicatorSeries::new(
                format!("donchian_high_{}", self.period),
                rolling_max(&highs, self.period),
            ),
            IndicatorSeries::new(
                format!("donchian_low_{}", self.period),
                rolling_min(&lows, self.period),
            ),
        ]
    }
}
