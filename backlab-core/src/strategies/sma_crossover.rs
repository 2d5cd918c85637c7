//! SMA crossover — fast rolling mean crossing the slow one.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::indicators::sma;
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

/// Buy when the fast SMA crosses above the slow SMA, sell when it crosses
/// below. Classic trend following.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    fast_period: usize,
    slow_period: usize,
}

impl SmaCrossover {
    pub const ID: &'static str = "sma_crossover";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            fast_period: resolve_param(params, "fast_period", 20.0) as usize,
            slow_period: resolve_param(params, "slow_period", 50.0) as usize,
        }
    }
}

impl Default for SmaCrossover {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for SmaCrossover {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "SMA Crossover"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([
            ("fast_period".to_string(), ParamSpec::new(20.0, 2.0, 200.0, 1.0)),
            ("slow_period".to_string(), ParamSpec::new(50.0, 5.0, 500.0, 1.0)),
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
        let fast = sma(&closes, self.fast_period);
        let slow = sma(&closes, self.slow_period);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                // Warmup values are NaN; these comparisons stay false.
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
                format!("sma_{}", self.fast_period),
                sma(&closes, self.fast_period),
            ),
            IndicatorSeries::new(
                format!("sma_{}", self.slow_period),
                sma(&closes, self.slow_period),
            ),
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
    fn warmup_bars_hold() {
        let mut params = BTreeMap::new();
        params.insert("fast_period".to_string(), 2.0);
        params.insert("slow_period".to_string(), 4.0);
        let strat = SmaCrossover::new(&params);

        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let signals = strat.signals(&candles);
        assert_eq!(signals.len(), candles.len());
        // Slow SMA undefined until index 3; nothing can cross before index 4.
        assert!(signals[..4].iter().all(|s| s.is_hold()));
    }

    #[test]
    fn detects_cross_up_then_down() {
        let mut params = BTreeMap::new();
        params.insert("fast_period".to_string(), 2.0);
        params.insert("slow_period".to_string(), 4.0);
        let strat = SmaCrossover::new(&params);

        // Downtrend, sharp reversal up, then sharp reversal down.
        let candles = make_candles(&[
            110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 112.0, 118.0, 124.0, 100.0,
            90.0, 80.0,
        ]);
        let signals = strat.signals(&candles);
        assert!(signals.contains(&Signal::Buy));
        let buy = signals.iter().position(|s| *s == Signal::Buy).unwrap();
        let sell = signals.iter().rposition(|s| *s == Signal::Sell).unwrap();
        assert!(buy < sell);
    }

    #[test]
    fn defaults_match_declaration() {
        let strat = SmaCrossover::default();
        let specs = strat.param_specs();
        let params = strat.params();
        for (name, spec) in &specs {
            assert_eq!(params[name], spec.default);
        }
    }
}
