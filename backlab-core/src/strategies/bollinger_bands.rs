//! Bollinger bands — band-touch mean reversion.

use std::collections::BTreeMap;

use crate::domain::{Candle, Signal};
use crate::indicators::{rolling_std, sma};
use crate::strategy::{resolve_param, IndicatorSeries, ParamSpec, Strategy};

/// Buy when the close touches the lower band, sell when it touches the
/// upper band. Bands are a rolling mean plus/minus a multiple of the
/// rolling sample standard deviation.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev: f64,
}

impl BollingerBands {
    pub const ID: &'static str = "bollinger_bands";

    pub fn new(params: &BTreeMap<String, f64>) -> Self {
        Self {
            period: resolve_param(params, "period", 20.0) as usize,
            std_dev: resolve_param(params, "std_dev", 2.0),
        }
    }

    fn bands(&self, closes: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mid = sma(closes, self.period);
        let std = rolling_std(closes, self.period);
        let upper: Vec<f64> = mid
            .iter()
            .zip(std.iter())
            .map(|(m, s)| m + self.std_dev * s)
            .collect();
        let lower: Vec<f64> = mid
            .iter()
            .zip(std.iter())
            .map(|(m, s)| m - self.std_dev * s)
            .collect();
        (lower, mid, upper)
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Strategy for BollingerBands {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Bollinger Bands"
    }

    fn param_specs(&self) -> BTreeMap<String, ParamSpec> {
        BTreeMap::from([
            ("period".to_string(), ParamSpec::new(20.0, 5.0, 100.0, 1.0)),
            ("std_dev".to_string(), ParamSpec::new(2.0, 0.5, 4.0, 0.1)),
        ])
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("period".to_string(), self.period as f64),
            ("std_dev".to_string(), self.std_dev),
        ])
    }

    fn signals(&self, candles: &[Candle]) -> Vec<Signal> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (lower, _, upper) = self.bands(&closes);

        (0..candles.len())
            .map(|i| {
                if i == 0 {
                    return Signal::Hold;
                }
                // A touch, not a dwell: the previous close must have been
                // strictly inside the band.
                if closes[i] >= upper[i] && closes[i - 1] < upper[i - 1] {
                    Signal::Sell
                } else if closes[i] <= lower[i] && closes[i - 1] > lower[i - 1] {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            })
            .collect()
    }

    fn overlays(&self, candles: &[Candle]) -> Vec<IndicatorSeries> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (lower, mid, upper) = self.bands(&closes);
        vec![
            IndicatorSeries::new("bb_upper", upper),
            IndicatorSeries::new("bb_mid", mid),
            IndicatorSeries::new("bb_lower", lower),
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
    fn buys_on_lower_band_touch() {
        let mut params = BTreeMap::new();
        params.insert("period".to_string(), 5.0);
        params.insert("std_dev".to_string(), 1.0);
        let strat = BollingerBands::new(&params);

        // Mild oscillation to establish bands, then a sharp drop through
        // the lower band.
        let closes = [
            100.0, 101.0, 99.0, 100.0, 101.0, 99.0, 100.0, 101.0, 80.0, 80.0,
        ];
        let signals = strat.signals(&make_candles(&closes));
        assert!(signals.contains(&Signal::Buy));
    }

    #[test]
    fn flat_series_never_signals() {
        // Zero std collapses the bands onto the price; the previous close
        // is never strictly inside, so no touch registers.
        let strat = BollingerBands::default();
        let signals = strat.signals(&make_candles(&[50.0; 40]));
        assert!(signals.iter().all(|s| s.is_hold()));
    }
}
