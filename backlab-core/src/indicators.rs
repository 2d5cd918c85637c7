//! Indicator math shared by the strategy library.
//!
//! Every function returns a series aligned 1:1 with its input, with NaN in
//! the warmup prefix (first valid value at index `period - 1`, one bar later
//! for difference-based indicators). Strategies compare against these values
//! directly; a comparison involving NaN is false, so warmup bars never fire.

/// Rolling mean over a `period`-bar window.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    debug_assert!(period >= 1, "SMA period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }
    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = sum / period as f64;
    for i in period..n {
        sum += values[i] - values[i - period];
        result[i] = sum / period as f64;
    }
    result
}

/// Exponential moving average, recursive form seeded at the first value.
///
/// `ema[0] = x[0]`, `ema[i] = alpha * x[i] + (1 - alpha) * ema[i-1]` with
/// `alpha = 2 / (span + 1)`. No warmup prefix: every index is defined.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    debug_assert!(span >= 1, "EMA span must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 {
        return result;
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = values[0];
    result[0] = prev;
    for i in 1..n {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

/// Rolling sample standard deviation (`n - 1` divisor) over a window.
///
/// A one-bar window has undefined sample variance, so `period == 1` yields
/// all NaN past the warmup as well.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    debug_assert!(period >= 1, "rolling_std period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period || period < 2 {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (period - 1) as f64;
        result[i] = var.sqrt();
    }
    result
}

/// Rolling maximum over a `period`-bar window.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_fold(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Rolling minimum over a `period`-bar window.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_fold(values, period, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

fn rolling_fold(values: &[f64], period: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    debug_assert!(period >= 1, "rolling window must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }
    for i in (period - 1)..n {
        result[i] = f(&values[i + 1 - period..=i]);
    }
    result
}

/// Rolling-mean RSI over close prices.
///
/// Per-bar gains and losses (first bar has no change and contributes zero),
/// averaged over a `period` window, combined as `100 - 100 / (1 + rs)`.
/// When the loss average is zero the ratio saturates and RSI reads 100;
/// when both averages are zero the value is undefined (NaN) and no signal
/// condition can fire on that bar.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    debug_assert!(period >= 1, "RSI period must be >= 1");
    let n = closes.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            gains[i] = delta;
        } else {
            losses[i] = -delta;
        }
    }
    let avg_gain = sma(&gains, period);
    let avg_loss = sma(&losses, period);

    avg_gain
        .iter()
        .zip(avg_loss.iter())
        .map(|(&g, &l)| {
            let rs = g / l;
            100.0 - (100.0 / (1.0 + rs))
        })
        .collect()
}
