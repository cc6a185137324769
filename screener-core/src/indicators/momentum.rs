//! Momentum (MOM): x[t] - x[t-period]. Lookback: period.

pub fn mom(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }
    for i in period..n {
        // NaN on either side propagates through the subtraction
        result[i] = values[i] - values[i - period];
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn momentum_basic() {
        let result = mom(&[10.0, 12.0, 15.0, 11.0], 2);
        assert!(result[1].is_nan());
        assert_approx(result[2], 5.0, DEFAULT_EPSILON);
        assert_approx(result[3], -1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_period_is_all_nan() {
        assert!(mom(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }
}
