//! Relative Strength Index (RSI) and Chande Momentum Oscillator (CMO).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! CMO = 100 * (avg_gain - avg_loss) / (avg_gain + avg_loss) = 2 * RSI - 100
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0; flat → 50.

pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let changes: Vec<f64> = (0..n)
        .map(|i| if i == 0 { f64::NAN } else { values[i] - values[i - 1] })
        .collect();

    // Seed: average gain and average loss over first `period` changes
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &ch in &changes[1..=period] {
        if ch.is_nan() {
            return result;
        }
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result[period] = compute_rsi(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        if changes[i].is_nan() {
            return result;
        }

        let gain = changes[i].max(0.0);
        let loss = (-changes[i]).max(0.0);

        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

        result[i] = compute_rsi(avg_gain, avg_loss);
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

pub fn cmo(values: &[f64], period: usize) -> Vec<f64> {
    rsi(values, period)
        .into_iter()
        .map(|r| 2.0 * r - 100.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rsi_all_gains_is_100() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&values, 14);
        assert!(result[13].is_nan());
        assert_approx(result[14], 100.0, DEFAULT_EPSILON);
        assert_approx(result[19], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_approx(rsi(&values, 14)[19], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_flat_is_50() {
        assert_approx(rsi(&[10.0; 6], 3)[5], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_known_seed_value() {
        // Changes: +2, -1, +2 → avg_gain 4/3, avg_loss 1/3 → RS 4 → RSI 80
        let result = rsi(&[10.0, 12.0, 11.0, 13.0], 3);
        assert_approx(result[3], 80.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_bounded() {
        let values: Vec<f64> = (0..100).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        for v in rsi(&values, 14).iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn cmo_maps_rsi_onto_symmetric_range() {
        let result = cmo(&[10.0, 12.0, 11.0, 13.0], 3);
        assert_approx(result[3], 60.0, DEFAULT_EPSILON);
        assert_approx(cmo(&[10.0; 6], 3)[5], 0.0, DEFAULT_EPSILON);
    }
}
