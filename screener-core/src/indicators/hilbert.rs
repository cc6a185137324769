//! Ehlers' Hilbert transform family: MESA adaptive moving average and the
//! instantaneous trendline.
//!
//! Both are recursive. They run over the first contiguous finite segment of
//! the input and stay NaN from the first gap after it.

use super::first_valid_run;

/// Bars before the first MAMA/FAMA value.
pub const MAMA_LOOKBACK: usize = 32;
/// Bars before the first trendline value.
pub const HT_TRENDLINE_LOOKBACK: usize = 63;

const A: f64 = 0.0962;
const B: f64 = 0.5769;

/// Hilbert FIR over `v` ending at `t`; samples before the start count as zero.
fn transform(v: &[f64], t: usize, adjustment: f64) -> f64 {
    let at = |k: usize| if t >= k { v[t - k] } else { 0.0 };
    (A * at(0) + B * at(2) - B * at(4) - A * at(6)) * adjustment
}

/// Per-bar dominant cycle measurement.
#[derive(Debug, Clone, Copy)]
struct Cycle {
    smooth_period: f64,
    /// In degrees.
    phase: f64,
}

fn cycles(prices: &[f64]) -> Vec<Cycle> {
    let n = prices.len();
    let mut smooth = vec![0.0; n];
    let mut detrender = vec![0.0; n];
    let mut in_phase = vec![0.0; n];
    let mut quadrature = vec![0.0; n];
    let mut out = Vec::with_capacity(n);

    let (mut i2_prev, mut q2_prev, mut re_prev, mut im_prev) = (0.0, 0.0, 0.0, 0.0);
    let (mut period, mut smooth_period) = (0.0_f64, 0.0_f64);

    for t in 0..n {
        let price = |k: usize| prices[t.saturating_sub(k)];
        smooth[t] = (4.0 * price(0) + 3.0 * price(1) + 2.0 * price(2) + price(3)) / 10.0;

        let adjustment = 0.075 * period + 0.54;
        detrender[t] = transform(&smooth, t, adjustment);
        quadrature[t] = transform(&detrender, t, adjustment);
        in_phase[t] = if t >= 3 { detrender[t - 3] } else { 0.0 };

        let j_i = transform(&in_phase, t, adjustment);
        let j_q = transform(&quadrature, t, adjustment);

        let i2 = 0.2 * (in_phase[t] - j_q) + 0.8 * i2_prev;
        let q2 = 0.2 * (quadrature[t] + j_i) + 0.8 * q2_prev;
        let re = 0.2 * (i2 * i2_prev + q2 * q2_prev) + 0.8 * re_prev;
        let im = 0.2 * (i2 * q2_prev - q2 * i2_prev) + 0.8 * im_prev;
        (i2_prev, q2_prev, re_prev, im_prev) = (i2, q2, re, im);

        let prev_period = period;
        let mut measured = prev_period;
        if im != 0.0 && re != 0.0 {
            measured = 360.0 / (im / re).atan().to_degrees();
        }
        measured = measured
            .min(1.5 * prev_period)
            .max(0.67 * prev_period)
            .clamp(6.0, 50.0);
        period = 0.2 * measured + 0.8 * prev_period;
        smooth_period = 0.33 * period + 0.67 * smooth_period;

        let phase = if in_phase[t] != 0.0 {
            (quadrature[t] / in_phase[t]).atan().to_degrees()
        } else {
            0.0
        };
        out.push(Cycle {
            smooth_period,
            phase,
        });
    }
    out
}

/// Bounds of the first contiguous finite run.
fn segment(values: &[f64]) -> Option<(usize, usize)> {
    let start = first_valid_run(values, 1)?;
    let end = values[start..]
        .iter()
        .position(|v| v.is_nan())
        .map_or(values.len(), |k| start + k);
    Some((start, end))
}

/// MESA adaptive moving average. Returns `(mama, fama)`.
///
/// The smoothing factor is `fast_limit / phase_rate`, floored at `slow_limit`.
pub fn mama(values: &[f64], fast_limit: f64, slow_limit: f64) -> (Vec<f64>, Vec<f64>) {
    let n = values.len();
    let mut mama_out = vec![f64::NAN; n];
    let mut fama_out = vec![f64::NAN; n];
    let Some((start, end)) = segment(values) else {
        return (mama_out, fama_out);
    };
    let prices = &values[start..end];

    let (mut m, mut f) = (prices[0], prices[0]);
    let mut prev_phase = 0.0;
    for (t, cycle) in cycles(prices).into_iter().enumerate() {
        let delta = (prev_phase - cycle.phase).max(1.0);
        prev_phase = cycle.phase;
        let alpha = (fast_limit / delta).max(slow_limit);
        m = alpha * prices[t] + (1.0 - alpha) * m;
        f = 0.5 * alpha * m + (1.0 - 0.5 * alpha) * f;
        if t >= MAMA_LOOKBACK {
            mama_out[start + t] = m;
            fama_out[start + t] = f;
        }
    }
    (mama_out, fama_out)
}

/// Instantaneous trendline: price averaged over the dominant cycle, then
/// smoothed with a 4-3-2-1 weighting.
pub fn ht_trendline(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    let Some((start, end)) = segment(values) else {
        return result;
    };
    let prices = &values[start..end];

    let mut itrend = vec![0.0; prices.len()];
    for (t, cycle) in cycles(prices).into_iter().enumerate() {
        let dc_period = ((cycle.smooth_period + 0.5) as usize).max(1);
        let from = (t + 1).saturating_sub(dc_period);
        let window = &prices[from..=t];
        itrend[t] = window.iter().sum::<f64>() / window.len() as f64;

        if t >= HT_TRENDLINE_LOOKBACK {
            result[start + t] =
                (4.0 * itrend[t] + 3.0 * itrend[t - 1] + 2.0 * itrend[t - 2] + itrend[t - 3])
                    / 10.0;
        }
    }
    result
}
