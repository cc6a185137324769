//! Statistic functions: least-squares regression over a rolling window,
//! Pearson correlation, and beta.
//!
//! Regression uses x = 0..period-1 within each window, so the fitted value at
//! the window end is `intercept + slope * (period - 1)` and the time series
//! forecast is one step further.

use super::math::align_tail;
use super::rolling;

/// Least-squares (slope, intercept) of `window` against x = 0..len-1.
fn fit(window: &[f64]) -> (f64, f64) {
    let n = window.len() as f64;
    let sum_x = n * (n - 1.0) / 2.0;
    let sum_xx = n * (n - 1.0) * (2.0 * n - 1.0) / 6.0;
    let sum_y: f64 = window.iter().sum();
    let sum_xy: f64 = window.iter().enumerate().map(|(x, y)| x as f64 * y).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    let slope = if denom == 0.0 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denom
    };
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

pub fn linearreg(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| {
        let (m, b) = fit(w);
        b + m * (w.len() - 1) as f64
    })
}

pub fn linearreg_slope(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| fit(w).0)
}

pub fn linearreg_intercept(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| fit(w).1)
}

/// Slope expressed as an angle in degrees.
pub fn linearreg_angle(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| fit(w).0.atan().to_degrees())
}

/// Time series forecast: regression line extended one step past the window.
pub fn tsf(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| {
        let (m, b) = fit(w);
        b + m * w.len() as f64
    })
}

/// Rolling Pearson correlation of two tail-aligned series.
pub fn correl(a: &[f64], b: &[f64], period: usize) -> Vec<f64> {
    let (a, b) = align_tail(a, b);
    let n = a.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let xs = &a[(i + 1 - period)..=i];
        let ys = &b[(i + 1 - period)..=i];
        if xs.iter().chain(ys).any(|v| v.is_nan()) {
            continue;
        }
        let p = period as f64;
        let mx = xs.iter().sum::<f64>() / p;
        let my = ys.iter().sum::<f64>() / p;
        let mut sxy = 0.0;
        let mut sxx = 0.0;
        let mut syy = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            sxy += (x - mx) * (y - my);
            sxx += (x - mx).powi(2);
            syy += (y - my).powi(2);
        }
        let denom = (sxx * syy).sqrt();
        result[i] = if denom == 0.0 { 0.0 } else { sxy / denom };
    }
    result
}

/// Beta of `b` against `a`, computed on one-period returns over `period`
/// return observations. With `a` the market index and `b` a stock, this is
/// the stock's market beta.
pub fn beta(a: &[f64], b: &[f64], period: usize) -> Vec<f64> {
    let (a, b) = align_tail(a, b);
    let n = a.len();
    let returns = |s: &[f64]| -> Vec<f64> {
        (0..n)
            .map(|i| {
                if i == 0 || s[i - 1] == 0.0 {
                    f64::NAN
                } else {
                    s[i] / s[i - 1] - 1.0
                }
            })
            .collect()
    };
    let (ra, rb) = (returns(a), returns(b));

    let mut result = vec![f64::NAN; n];
    if period == 0 || n <= period {
        return result;
    }
    for i in period..n {
        let xs = &ra[(i + 1 - period)..=i];
        let ys = &rb[(i + 1 - period)..=i];
        if xs.iter().chain(ys).any(|v| v.is_nan()) {
            continue;
        }
        let p = period as f64;
        let sx: f64 = xs.iter().sum();
        let sy: f64 = ys.iter().sum();
        let sxx: f64 = xs.iter().map(|x| x * x).sum();
        let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
        let denom = p * sxx - sx * sx;
        result[i] = if denom == 0.0 { 0.0 } else { (p * sxy - sx * sy) / denom };
    }
    result
}
