//! SuperTrend — ATR-banded trend following.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

const BAND_EPS: f64 = 1e-9;

/// Buy when the SuperTrend line flips below price (uptrend), sell when it
/// flips back above (downtrend).
#[derive(Debug, Clone)]
pub struct Supertrend {
    atr_period: usize,
    multiplier: f64,
}

impl Supertrend {
    pub const ID: &'static str = "supertrend";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            atr_period: (resolve_param(params, "atr_period", 10.0) as usize).max(1),
            multiplier: resolve_param(params, "multiplier", 3.0),
        }
    }

    /// SuperTrend line and per-bar trend direction (1 up, -1 down).
    fn compute(&self, candles: &[Candle]) -> (Vec<f64>, Vec<i8>) {
        let n = candles.len();
        if n == 0 {
            return (Vec::new(), Vec::new());
        }
        let period = self.atr_period;

        let mut tr = vec![0.0; n];
        tr[0] = candles[0].high - candles[0].low;
        for i in 1..n {
            let prev_close = candles[i - 1].close;
            tr[i] = (candles[i].high - candles[i].low)
                .max((candles[i].high - prev_close).abs())
                .max((candles[i].low - prev_close).abs());
        }

        // Wilder smoothing seeded with the simple average of the first
        // window; zero through the warmup, which collapses the early bands
        // onto the hl2 midline.
        let mut atr = vec![0.0; n];
        if period <= n {
            atr[period - 1] = tr[..period].iter().sum::<f64>() / period as f64;
            for i in period..n {
                atr[i] = (atr[i - 1] * (period as f64 - 1.0) + tr[i]) / period as f64;
            }
        }

        let mut upper = vec![0.0; n];
        let mut lower = vec![0.0; n];
        for i in 0..n {
            let hl2 = (candles[i].high + candles[i].low) / 2.0;
            upper[i] = hl2 + self.multiplier * atr[i];
            lower[i] = hl2 - self.multiplier * atr[i];
        }
        // Band ratchet: while price stays below the upper band it may only
        // tighten downward, and the lower band mirrors that upward. At index
        // `i` the slot still holds the basic band and `i - 1` the final one.
        for i in 1..n {
            let prev_close = candles[i - 1].close;
            if !(upper[i] < upper[i - 1] || prev_close > upper[i - 1]) {
                upper[i] = upper[i - 1];
            }
            if !(lower[i] > lower[i - 1] || prev_close < lower[i - 1]) {
                lower[i] = lower[i - 1];
            }
        }

        let mut line = vec![0.0; n];
        let mut trend = vec![1i8; n];
        for i in 1..n {
            let prev = line[i - 1];
            let was_down = prev == upper[i - 1]
                || (i > 1 && (prev - upper[i - 1]).abs() < BAND_EPS);
            if was_down {
                if candles[i].close > upper[i] {
                    trend[i] = 1;
                    line[i] = lower[i];
                } else {
                    trend[i] = -1;
                    line[i] = upper[i];
                }
            } else if candles[i].close < lower[i] {
                trend[i] = -1;
                line[i] = upper[i];
            } else {
                trend[i] = 1;
                line[i] = lower[i];
            }
        }
        // Row 0 is classified after the loop; the i == 1 step reads the
        // zero placeholder.
        if candles[0].close <= upper[0] {
            trend[0] = -1;
            line[0] = upper[0];
        } else {
            trend[0] = 1;
            line[0] = lower[0];
        }
        (line, trend)
    }
}

impl Default for Supertrend {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for Supertrend {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "SuperTrend"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([
            ("atr_period".to_string(), ParamSpec::new(10.0, 5.0, 50.0, 1.0)),
            ("multiplier".to_string(), ParamSpec::new(3.0, 1.0, 6.0, 0.5)),
        ])
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("atr_period".to_string(), self.atr_period as f64),
            ("multiplier".to_string(), self.multiplier),
        ])
    }

    fn signals(&self, candles: &[Candle]) -> Vec<Signal> {
        let (_, trend) = self.compute(candles);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                if trend[i] == -1 && trend[i - 1] == 1 {
                    Signal::Sell
                } else if trend[i] == 1 && trend[i - 1] == -1 {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            })
            .collect()
    }

    fn overlays(&self, candles: &[Candle]) -> Vec<IndicatorSeries> {
        let (line, _) = self.compute(candles);
        vec![IndicatorSeries::new("supertrend", line)]
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
                high: close + 2.0,
                low: close - 2.0,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn steady_decline_never_buys() {
        let strat = Supertrend::default();
        let closes: Vec<f64> = (0..40).map(|i| 200.0 - 2.0 * i as f64).collect();
        let candles = make_candles(&closes);

        let signals = strat.signals(&candles);
        assert!(!signals.contains(&Signal::Buy));
    }

    #[test]
    fn reversals_flip_the_trend() {
        let strat = Supertrend::default();
        // Decline, strong rally, then a steep selloff: one flip up and one
        // flip back down.
        let mut closes: Vec<f64> = (0..30).map(|i| 150.0 - 2.0 * i as f64).collect();
        closes.extend((0..30).map(|i| 95.0 + 3.0 * i as f64));
        closes.extend((0..20).map(|i| 182.0 - 4.0 * i as f64));
        let candles = make_candles(&closes);

        let signals = strat.signals(&candles);
        let buy = signals.iter().position(|s| *s == Signal::Buy);
        let sell = signals.iter().rposition(|s| *s == Signal::Sell);
        assert!(buy.is_some(), "rally never flipped the trend up");
        assert!(sell.is_some(), "selloff never flipped the trend down");
        assert!(buy.unwrap() > 30, "flip fired before the rally began");
        assert!(sell.unwrap() > buy.unwrap());
    }

    #[test]
    fn line_tracks_the_active_band() {
        let strat = Supertrend::default();
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + 1.5 * i as f64 + 3.0 * (i as f64 / 5.0).sin())
            .collect();
        let candles = make_candles(&closes);

        let (line, trend) = strat.compute(&candles);
        for i in 0..candles.len() {
            // In an uptrend the line sits below price, in a downtrend above.
            if trend[i] == 1 {
                assert!(line[i] <= candles[i].close + 1e-9, "bar {i}");
            } else {
                assert!(line[i] >= candles[i].close - 1e-9, "bar {i}");
            }
        }
    }
}
