//! Rate-of-change family.
//!
//! ROC     = (x[t] / x[t-n] - 1) * 100
//! ROCP    = (x[t] - x[t-n]) / x[t-n]
//! ROCR    = x[t] / x[t-n]
//! ROCR100 = x[t] / x[t-n] * 100
//! Lookback: period. A zero base yields 0.

fn lagged<F>(values: &[f64], period: usize, f: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }
    for i in period..n {
        let (current, base) = (values[i], values[i - period]);
        if current.is_nan() || base.is_nan() {
            continue;
        }
        result[i] = if base == 0.0 { 0.0 } else { f(current, base) };
    }
    result
}

pub fn roc(values: &[f64], period: usize) -> Vec<f64> {
    lagged(values, period, |c, b| (c / b - 1.0) * 100.0)
}

pub fn rocp(values: &[f64], period: usize) -> Vec<f64> {
    lagged(values, period, |c, b| (c - b) / b)
}

pub fn rocr(values: &[f64], period: usize) -> Vec<f64> {
    lagged(values, period, |c, b| c / b)
}

pub fn rocr100(values: &[f64], period: usize) -> Vec<f64> {
    lagged(values, period, |c, b| c / b * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn roc_basic() {
        let result = roc(&[100.0, 105.0, 110.0], 2);
        assert!(result[1].is_nan());
        assert_approx(result[2], 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn variants_agree() {
        let values = [50.0, 40.0, 60.0];
        assert_approx(rocp(&values, 2)[2], 0.2, DEFAULT_EPSILON);
        assert_approx(rocr(&values, 2)[2], 1.2, DEFAULT_EPSILON);
        assert_approx(rocr100(&values, 2)[2], 120.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_base_yields_zero() {
        assert_approx(roc(&[0.0, 5.0], 1)[1], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_base_propagates() {
        assert!(roc(&[f64::NAN, 5.0, 6.0], 1)[1].is_nan());
        assert!(!roc(&[f64::NAN, 5.0, 6.0], 1)[2].is_nan());
    }
}
