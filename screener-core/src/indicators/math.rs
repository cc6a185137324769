//! Math operators: element-wise arithmetic and rolling extremes.
//!
//! Binary operators align their inputs on the tail: the longer input is
//! truncated from the front so both end on the same (latest) observation.

use super::rolling;

/// Truncate the longer slice from the front so both have equal length.
pub fn align_tail<'a>(a: &'a [f64], b: &'a [f64]) -> (&'a [f64], &'a [f64]) {
    let n = a.len().min(b.len());
    (&a[a.len() - n..], &b[b.len() - n..])
}

fn zip_with<F>(a: &[f64], b: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    let (a, b) = align_tail(a, b);
    a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect()
}

pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| x + y)
}

pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| x - y)
}

pub fn mult(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| x * y)
}

/// Division by zero yields an infinity, which surfaces as a degenerate result.
pub fn div(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| x / y)
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn rolling_sum(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().sum())
}

/// Absolute series index of the highest value in each window (latest on ties).
pub fn max_index(values: &[f64], period: usize) -> Vec<f64> {
    extreme_index(values, period, |v, best| v >= best)
}

/// Absolute series index of the lowest value in each window (latest on ties).
pub fn min_index(values: &[f64], period: usize) -> Vec<f64> {
    extreme_index(values, period, |v, best| v <= best)
}

fn extreme_index<F>(values: &[f64], period: usize, better: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> bool,
{
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let start = i + 1 - period;
        let window = &values[start..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mut best = window[0];
        let mut offset = 0;
        for (j, &v) in window.iter().enumerate().skip(1) {
            if better(v, best) {
                best = v;
                offset = j;
            }
        }
        result[i] = (start + offset) as f64;
    }
    result
}

/// (MIN, MAX) over the window.
pub fn min_max(values: &[f64], period: usize) -> (Vec<f64>, Vec<f64>) {
    (rolling_min(values, period), rolling_max(values, period))
}

/// (MININDEX, MAXINDEX) over the window.
pub fn min_max_index(values: &[f64], period: usize) -> (Vec<f64>, Vec<f64>) {
    (min_index(values, period), max_index(values, period))
}

/// (highest + lowest) / 2 of one series.
pub fn midpoint(values: &[f64], period: usize) -> Vec<f64> {
    let (lo, hi) = min_max(values, period);
    lo.iter().zip(&hi).map(|(l, h)| (l + h) / 2.0).collect()
}

/// (highest high + lowest low) / 2.
pub fn midprice(high: &[f64], low: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(high, period);
    let ll = rolling_min(low, period);
    hh.iter().zip(&ll).map(|(h, l)| (h + l) / 2.0).collect()
}
