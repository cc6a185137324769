//! Parabolic SAR: Wilder's acceleration factor system.
//!
//! Inherently sequential/stateful: maintains direction, extreme point (EP),
//! and acceleration factor (AF). [`sar`] uses one AF schedule for both
//! directions; [`sar_ext`] takes separate long and short schedules, a forced
//! start direction and an offset applied on every reversal.
//!
//! Initial direction (auto): short if the second bar shows dominant downward
//! directional movement, long otherwise. Lookback: 1.

/// Parameters of the extended SAR. Defaults reproduce [`sar`] with 0.02/0.2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarExtParams {
    /// 0 detects the start direction; positive starts long at this SAR,
    /// negative starts short at its absolute value.
    pub start_value: f64,
    /// Fraction the SAR is pushed past the EP on reversal.
    pub offset_on_reverse: f64,
    pub af_init_long: f64,
    pub af_long: f64,
    pub af_max_long: f64,
    pub af_init_short: f64,
    pub af_short: f64,
    pub af_max_short: f64,
}

impl Default for SarExtParams {
    fn default() -> Self {
        Self {
            start_value: 0.0,
            offset_on_reverse: 0.0,
            af_init_long: 0.02,
            af_long: 0.02,
            af_max_long: 0.2,
            af_init_short: 0.02,
            af_short: 0.02,
            af_max_short: 0.2,
        }
    }
}

pub fn sar(high: &[f64], low: &[f64], acceleration: f64, maximum: f64) -> Vec<f64> {
    let params = SarExtParams {
        af_init_long: acceleration,
        af_long: acceleration,
        af_max_long: maximum,
        af_init_short: acceleration,
        af_short: acceleration,
        af_max_short: maximum,
        ..SarExtParams::default()
    };
    sar_ext(high, low, &params).into_iter().map(f64::abs).collect()
}

/// Extended SAR. Values are negative while the system is short.
pub fn sar_ext(high: &[f64], low: &[f64], params: &SarExtParams) -> Vec<f64> {
    let n = high.len().min(low.len());
    let mut result = vec![f64::NAN; n];

    if n < 2 || params.af_long <= 0.0 || params.af_short <= 0.0 {
        return result;
    }
    if high[0].is_nan() || low[0].is_nan() || high[1].is_nan() || low[1].is_nan() {
        return result;
    }

    let max_long = params.af_max_long.max(params.af_init_long).max(params.af_long);
    let max_short = params.af_max_short.max(params.af_init_short).max(params.af_short);
    let signed = |value: f64, long: bool| if long { value } else { -value };

    let mut is_long = if params.start_value > 0.0 {
        true
    } else if params.start_value < 0.0 {
        false
    } else {
        let down_move = low[0] - low[1];
        let up_move = high[1] - high[0];
        !(down_move > up_move && down_move > 0.0)
    };
    let mut af = if is_long {
        params.af_init_long
    } else {
        params.af_init_short
    };
    let (mut sar, mut ep) = match (is_long, params.start_value) {
        (true, start) if start != 0.0 => (start, high[1]),
        (false, start) if start != 0.0 => (start.abs(), low[1]),
        (true, _) => (low[0], high[1]),
        (false, _) => (high[0], low[1]),
    };
    result[1] = signed(sar, is_long);

    for i in 2..n {
        if high[i].is_nan() || low[i].is_nan() {
            // Sequential state cannot continue past a gap
            return result;
        }

        let mut next = sar + af * (ep - sar);

        if is_long {
            // SAR must not be above the two previous lows
            next = next.min(low[i - 1]).min(low[i - 2]);

            if low[i] < next {
                is_long = false;
                next = ep * (1.0 + params.offset_on_reverse);
                ep = low[i];
                af = params.af_init_short;
            } else if high[i] > ep {
                ep = high[i];
                af = (af + params.af_long).min(max_long);
            }
        } else {
            // SAR must not be below the two previous highs
            next = next.max(high[i - 1]).max(high[i - 2]);

            if high[i] > next {
                is_long = true;
                next = ep * (1.0 - params.offset_on_reverse);
                ep = high[i];
                af = params.af_init_long;
            } else if low[i] < ep {
                ep = low[i];
                af = (af + params.af_short).min(max_short);
            }
        }

        sar = next;
        result[i] = signed(sar, is_long);
    }

    result
}
