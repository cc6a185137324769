//! Rolling dispersion and Bollinger Bands.
//!
//! VAR: population variance over `period` values.
//! STDDEV: sqrt(VAR) * nbdev.
//! BBANDS: middle = MA(matype), upper/lower = middle ± k * population stddev.
//! Lookback: period - 1.

use super::ema::{moving_average, MaType};
use super::rolling;

pub fn variance(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
    })
}

pub fn stddev(values: &[f64], period: usize, nbdev: f64) -> Vec<f64> {
    variance(values, period)
        .into_iter()
        .map(|v| v.sqrt() * nbdev)
        .collect()
}

/// Returns (upper, middle, lower).
pub fn bbands(
    values: &[f64],
    period: usize,
    nbdev_up: f64,
    nbdev_dn: f64,
    ma_type: MaType,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let middle = moving_average(values, period, ma_type);
    let sd = stddev(values, period, 1.0);

    let upper = middle
        .iter()
        .zip(&sd)
        .map(|(m, s)| m + nbdev_up * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&sd)
        .map(|(m, s)| m - nbdev_dn * s)
        .collect();

    (upper, middle, lower)
}
