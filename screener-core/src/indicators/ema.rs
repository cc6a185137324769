//! Exponential moving averages and the `MaType` selector.
//!
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: SMA of the first `period` consecutive valid values, so EMAs can be
//! chained (DEMA, TEMA, T3) on outputs that begin with NaN.
//! Lookback: period - 1 per EMA stage.

use serde::{Deserialize, Serialize};

use super::first_valid_run;
use super::sma::{sma, trima, wma};

/// Moving average family selected by the integer `matype` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaType {
    Sma,
    Ema,
    Wma,
    Dema,
    Tema,
    Trima,
    Kama,
    T3,
}

impl MaType {
    /// Map the conventional TA integer code. Code 7 (MAMA) is not supported.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Sma),
            1 => Some(Self::Ema),
            2 => Some(Self::Wma),
            3 => Some(Self::Dema),
            4 => Some(Self::Tema),
            5 => Some(Self::Trima),
            6 => Some(Self::Kama),
            8 => Some(Self::T3),
            _ => None,
        }
    }
}

/// Dispatch to the moving average named by `ma_type`.
pub fn moving_average(values: &[f64], period: usize, ma_type: MaType) -> Vec<f64> {
    match ma_type {
        MaType::Sma => sma(values, period),
        MaType::Ema => ema(values, period),
        MaType::Wma => wma(values, period),
        MaType::Dema => dema(values, period),
        MaType::Tema => tema(values, period),
        MaType::Trima => trima(values, period),
        MaType::Kama => kama(values, period),
        MaType::T3 => t3(values, period, 0.7),
    }
}

pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    ema_with_alpha(values, period, 2.0 / (period as f64 + 1.0))
}

pub(crate) fn ema_with_alpha(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let Some(start) = first_valid_run(values, period) else {
        return result;
    };
    let seed_end = start + period;

    let seed = values[start..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            // NaN taints everything after it
            return result;
        }
        let next = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = next;
        prev = next;
    }

    result
}

/// Double EMA: 2 * EMA - EMA(EMA).
pub fn dema(values: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema(values, period);
    let e2 = ema(&e1, period);
    e1.iter().zip(&e2).map(|(a, b)| 2.0 * a - b).collect()
}

/// Triple EMA: 3 * EMA - 3 * EMA(EMA) + EMA(EMA(EMA)).
pub fn tema(values: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema(values, period);
    let e2 = ema(&e1, period);
    let e3 = ema(&e2, period);
    (0..values.len())
        .map(|i| 3.0 * e1[i] - 3.0 * e2[i] + e3[i])
        .collect()
}

/// Tillson T3: three passes of the generalized DEMA with volume factor `vfactor`.
pub fn t3(values: &[f64], period: usize, vfactor: f64) -> Vec<f64> {
    let gd = |input: &[f64]| -> Vec<f64> {
        let e1 = ema(input, period);
        let e2 = ema(&e1, period);
        e1.iter()
            .zip(&e2)
            .map(|(a, b)| a * (1.0 + vfactor) - b * vfactor)
            .collect()
    };
    gd(&gd(&gd(values)))
}

/// Kaufman adaptive moving average (fast 2, slow 30).
///
/// Efficiency ratio ER = |x[t] - x[t-period]| / sum |x[j] - x[j-1]|.
/// Smoothing constant sc = (ER * (fast - slow) + slow)^2.
/// Seeded with x[period - 1]; first output at index `period`.
pub fn kama(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n <= period {
        return result;
    }
    if values[..=period].iter().any(|v| v.is_nan()) {
        return result;
    }

    let fast = 2.0 / 3.0;
    let slow = 2.0 / 31.0;
    let mut prev = values[period - 1];

    for i in period..n {
        if values[i].is_nan() {
            return result;
        }
        let change = (values[i] - values[i - period]).abs();
        let volatility: f64 = (i + 1 - period..=i)
            .map(|j| (values[j] - values[j - 1]).abs())
            .sum();
        let er = if volatility == 0.0 { 0.0 } else { change / volatility };
        let sc = (er * (fast - slow) + slow).powi(2);
        prev += sc * (values[i] - prev);
        result[i] = prev;
    }

    result
}
