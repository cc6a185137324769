//! Directional movement family: ±DM, ±DI, DX, ADX, ADXR.
//!
//! 1. +DM = high - prev_high if > (prev_low - low) and > 0, else 0.
//!    -DM = prev_low - low if > (high - prev_high) and > 0, else 0.
//! 2. Wilder-smooth TR, +DM, -DM over `period`.
//! 3. +DI = 100 * smooth(+DM) / smooth(TR), likewise -DI.
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI).
//! 5. ADX = Wilder smooth of DX. ADXR = (ADX[t] + ADX[t - (period - 1)]) / 2.
//!
//! Lookback: DI = period, ADX = 2 * period - 1.

use super::atr::{masked_true_range, wilder_smooth};

/// Raw (unsmoothed) directional movement. Index 0 is NaN.
fn directional_movement(high: &[f64], low: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = high.len().min(low.len());
    let mut plus = vec![f64::NAN; n];
    let mut minus = vec![f64::NAN; n];

    for i in 1..n {
        if high[i].is_nan() || low[i].is_nan() || high[i - 1].is_nan() || low[i - 1].is_nan() {
            continue;
        }
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];

        plus[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    (plus, minus)
}

/// Wilder-smoothed +DM, expressed as a running sum (average * period).
pub fn plus_dm(high: &[f64], low: &[f64], period: usize) -> Vec<f64> {
    let (plus, _) = directional_movement(high, low);
    scale(wilder_smooth(&plus, period), period as f64)
}

/// Wilder-smoothed -DM, expressed as a running sum (average * period).
pub fn minus_dm(high: &[f64], low: &[f64], period: usize) -> Vec<f64> {
    let (_, minus) = directional_movement(high, low);
    scale(wilder_smooth(&minus, period), period as f64)
}

fn scale(values: Vec<f64>, factor: f64) -> Vec<f64> {
    values.into_iter().map(|v| v * factor).collect()
}

/// (+DI, -DI) computed over a common smoothed true range.
fn directional_indicators(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> (Vec<f64>, Vec<f64>) {
    let (plus, minus) = directional_movement(high, low);
    let smooth_tr = wilder_smooth(&masked_true_range(high, low, close), period);
    let smooth_plus = wilder_smooth(&plus, period);
    let smooth_minus = wilder_smooth(&minus, period);

    let n = smooth_tr.len().min(smooth_plus.len());
    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];

    for i in 0..n {
        let tr = smooth_tr[i];
        if tr.is_nan() || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() {
            continue;
        }
        if tr == 0.0 {
            plus_di[i] = 0.0;
            minus_di[i] = 0.0;
            continue;
        }
        plus_di[i] = 100.0 * smooth_plus[i] / tr;
        minus_di[i] = 100.0 * smooth_minus[i] / tr;
    }

    (plus_di, minus_di)
}

pub fn plus_di(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    directional_indicators(high, low, close, period).0
}

pub fn minus_di(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    directional_indicators(high, low, close, period).1
}

pub fn dx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let (plus_di, minus_di) = directional_indicators(high, low, close, period);
    plus_di
        .iter()
        .zip(&minus_di)
        .map(|(p, m)| {
            let sum = p + m;
            if sum.is_nan() {
                f64::NAN
            } else if sum == 0.0 {
                0.0
            } else {
                100.0 * (p - m).abs() / sum
            }
        })
        .collect()
}

pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    wilder_smooth(&dx(high, low, close, period), period)
}

pub fn adxr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let adx = adx(high, low, close, period);
    let lag = period.saturating_sub(1);
    (0..adx.len())
        .map(|i| {
            if i < lag {
                f64::NAN
            } else {
                (adx[i] + adx[i - lag]) / 2.0
            }
        })
        .collect()
}
