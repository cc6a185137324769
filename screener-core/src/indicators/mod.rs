//! Numeric kernels behind the function catalog.
//!
//! Every kernel is a pure function over `&[f64]` slices and returns a vector
//! the same length as its (aligned) input. Indices inside the lookback window
//! hold NaN; a NaN inside a window makes that output NaN. Recursive kernels
//! (EMA, Wilder smoothing, SAR, the Hilbert family) stay NaN from the first
//! gap after their seed.
//!
//! Multi-series kernels (Aroon, Bollinger, MACD, MAMA, stochastics) return
//! tuples in the conventional TA order.

pub mod adx;
pub mod aroon;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod hilbert;
pub mod math;
pub mod momentum;
pub mod oscillators;
pub mod parabolic_sar;
pub mod patterns;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod statistics;

pub use adx::{adx, adxr, dx, minus_di, minus_dm, plus_di, plus_dm};
pub use aroon::{aroon, aroon_osc};
pub use atr::{atr, natr, true_range, wilder_smooth};
pub use bollinger::{bbands, stddev, variance};
pub use ema::{dema, ema, kama, moving_average, t3, tema, MaType};
pub use momentum::mom;
pub use hilbert::{ht_trendline, mama};
pub use parabolic_sar::{sar, sar_ext, SarExtParams};
pub use roc::{roc, rocp, rocr, rocr100};
pub use rsi::{cmo, rsi};
pub use sma::{sma, trima, wma};

/// First index `i` such that `values[i..i + period]` holds no NaN.
///
/// Used to seed recursive kernels, so they can be chained on outputs that
/// carry a NaN lookback prefix.
pub fn first_valid_run(values: &[f64], period: usize) -> Option<usize> {
    if period == 0 {
        return None;
    }
    let mut run = 0;
    for (i, v) in values.iter().enumerate() {
        if v.is_nan() {
            run = 0;
        } else {
            run += 1;
            if run == period {
                return Some(i + 1 - period);
            }
        }
    }
    None
}

/// Apply `f` to every full window of `period` values; NaN in a window yields NaN.
pub fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = f(window);
    }
    result
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
