//! Aroon indicator: measures time since highest high / lowest low.
//!
//! Aroon Up   = 100 * (period - bars_since_highest_high) / period
//! Aroon Down = 100 * (period - bars_since_lowest_low) / period
//! Window: period + 1 values (current plus `period` prior). Lookback: period.
//! Ties resolve to the most recent extreme.

/// Returns (aroon_down, aroon_up).
pub fn aroon(high: &[f64], low: &[f64], period: usize) -> (Vec<f64>, Vec<f64>) {
    let n = high.len().min(low.len());
    let mut down = vec![f64::NAN; n];
    let mut up = vec![f64::NAN; n];

    if period == 0 || n <= period {
        return (down, up);
    }

    let p = period as f64;
    for i in period..n {
        let start = i - period;

        let highs = &high[start..=i];
        if !highs.iter().any(|v| v.is_nan()) {
            let offset = extreme_offset(highs, |candidate, best| candidate >= best);
            up[i] = 100.0 * (p - (period - offset) as f64) / p;
        }

        let lows = &low[start..=i];
        if !lows.iter().any(|v| v.is_nan()) {
            let offset = extreme_offset(lows, |candidate, best| candidate <= best);
            down[i] = 100.0 * (p - (period - offset) as f64) / p;
        }
    }

    (down, up)
}

/// Offset within `window` of the extreme selected by `better`.
fn extreme_offset<F>(window: &[f64], better: F) -> usize
where
    F: Fn(f64, f64) -> bool,
{
    let mut best = window[0];
    let mut offset = 0;
    for (j, &v) in window.iter().enumerate().skip(1) {
        if better(v, best) {
            best = v;
            offset = j;
        }
    }
    offset
}

/// Aroon Oscillator = Aroon Up - Aroon Down.
pub fn aroon_osc(high: &[f64], low: &[f64], period: usize) -> Vec<f64> {
    let (down, up) = aroon(high, low, period);
    up.iter().zip(&down).map(|(u, d)| u - d).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rising_series_has_full_up() {
        let high: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let low: Vec<f64> = (0..10).map(|i| 8.0 + i as f64).collect();
        let (down, up) = aroon(&high, &low, 5);
        assert!(up[4].is_nan());
        assert_approx(up[9], 100.0, DEFAULT_EPSILON);
        // Lowest low is the oldest bar in the window
        assert_approx(down[9], 0.0, DEFAULT_EPSILON);
        assert_approx(aroon_osc(&high, &low, 5)[9], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bars_since_high_scales_linearly() {
        // Peak two bars ago in a 4-period window: 100 * (4 - 2) / 4 = 50
        let high = [1.0, 2.0, 9.0, 3.0, 2.0];
        let low = [0.0; 5];
        let (_, up) = aroon(&high, &low, 4);
        assert_approx(up[4], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ties_take_most_recent() {
        let high = [5.0, 5.0, 5.0];
        let low = [1.0, 1.0, 1.0];
        let (down, up) = aroon(&high, &low, 2);
        assert_approx(up[2], 100.0, DEFAULT_EPSILON);
        assert_approx(down[2], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_in_window() {
        let high = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let low = [0.0, 0.5, 1.0, 1.5, 2.0];
        let (down, up) = aroon(&high, &low, 2);
        assert!(up[2].is_nan());
        assert!(up[3].is_nan());
        assert!(!down[2].is_nan());
        assert!(!up[4].is_nan());
    }
}
