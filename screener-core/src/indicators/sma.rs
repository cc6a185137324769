//! Simple, weighted and triangular moving averages.
//!
//! SMA: rolling mean over `period` values. Lookback: period - 1.
//! WMA: linear weights 1..=period, newest heaviest. Lookback: period - 1.
//! TRIMA: SMA of an SMA, which weights the window centre most heavily.

use super::rolling;

/// Rolling mean. A running sum is maintained and recomputed only when a NaN
/// enters or leaves the window.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let p = period as f64;
    let mut sum = 0.0;
    let mut nan_in_window = false;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            nan_in_window = true;
        }
        sum += v;
    }

    if !nan_in_window {
        result[period - 1] = sum / p;
    }

    for i in period..n {
        let leaving = values[i - period];
        let entering = values[i];
        sum = sum - leaving + entering;

        if entering.is_nan() || leaving.is_nan() || nan_in_window {
            nan_in_window = false;
            sum = 0.0;
            for &v in &values[(i + 1 - period)..=i] {
                if v.is_nan() {
                    nan_in_window = true;
                }
                sum += v;
            }
            if nan_in_window {
                continue;
            }
        }

        result[i] = sum / p;
    }

    result
}

/// Linearly weighted moving average.
pub fn wma(values: &[f64], period: usize) -> Vec<f64> {
    let p = period as f64;
    let denom = p * (p + 1.0) / 2.0;
    rolling(values, period, |w| {
        w.iter()
            .enumerate()
            .map(|(j, v)| (j + 1) as f64 * v)
            .sum::<f64>()
            / denom
    })
}

/// Triangular moving average.
pub fn trima(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    if period % 2 == 1 {
        let half = (period + 1) / 2;
        sma(&sma(values, half), half)
    } else {
        let half = period / 2;
        sma(&sma(values, half), half + 1)
    }
}
