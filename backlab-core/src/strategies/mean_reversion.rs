//! Z-score mean reversion.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::indicators::{rolling_std, sma};
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

/// Buy when the close dips far below its rolling mean (z-score crossing
/// down through the buy threshold), sell when it stretches above (crossing
/// up through the sell threshold).
#[derive(Debug, Clone)]
pub struct MeanReversion {
    period: usize,
    z_buy: f64,
    z_sell: f64,
}

impl MeanReversion {
    pub const ID: &'static str = "mean_reversion";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            period: resolve_param(params, "period", 20.0) as usize,
            z_buy: resolve_param(params, "z_buy", -2.0),
            z_sell: resolve_param(params, "z_sell", 1.0),
        }
    }

    fn zscore(&self, closes: &[f64]) -> Vec<f64> {
        let mean = sma(closes, self.period);
        let std = rolling_std(closes, self.period);
        closes
            .iter()
            .zip(mean.iter().zip(std.iter()))
            .map(|(c, (m, s))| (c - m) / s)
            .collect()
    }
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for MeanReversion {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Mean Reversion (Z-Score)"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([
            ("period".to_string(), ParamSpec::new(20.0, 5.0, 200.0, 1.0)),
            ("z_buy".to_string(), ParamSpec::new(-2.0, -4.0, -0.5, 0.1)),
            ("z_sell".to_string(), ParamSpec::new(1.0, 0.5, 4.0, 0.1)),
        ])
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("period".to_string(), self.period as f64),
            ("z_buy".to_string(), self.z_buy),
            ("z_sell".to_string(), self.z_sell),
        ])
    }

    fn signals(&self, candles: &[Candle]) -> Vec<Signal> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let z = self.zscore(&closes);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                if z[i] > self.z_sell && z[i - 1] <= self.z_sell {
                    Signal::Sell
                } else if z[i] < self.z_buy && z[i - 1] >= self.z_buy {
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
                format!("mean_{}", self.period),
                sma(&closes, self.period),
            ),
            IndicatorSeries::new("zscore", self.zscore(&closes)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;
    use chrono::{Duration, TimeZone, Utc};

    fn make_candles(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                time: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn deep_dip_triggers_buy() {
        let mut params = BTreeMap::new();
        params.insert("period".to_string(), 5.0);
        params.insert("z_buy".to_string(), -1.5);
        let strat = MeanReversion::new(&params);

        let closes = [
            100.0, 101.0, 99.0, 100.0, 101.0, 100.0, 99.0, 101.0, 100.0, 70.0,
        ];
        let signals = strat.signals(&make_candles(&closes));
        assert_eq!(signals[9], Signal::Buy);
    }

    #[test]
    fn spike_triggers_sell() {
        let mut params = BTreeMap::new();
        params.insert("period".to_string(), 5.0);
        params.insert("z_sell".to_string(), 1.5);
        let strat = MeanReversion::new(&params);

        let closes = [
            100.0, 101.0, 99.0, 100.0, 101.0, 100.0, 99.0, 101.0, 100.0, 130.0,
        ];
        let signals = strat.signals(&make_candles(&closes));
        assert_eq!(signals[9], Signal::Sell);
    }

    #[test]
    fn flat_series_undefined_zscore_holds() {
        let strat = MeanReversion::default();
        let signals = strat.signals(&make_candles(&[42.0; 30]));
        assert!(signals.iter().all(|s| s.is_hold()));
    }
}
