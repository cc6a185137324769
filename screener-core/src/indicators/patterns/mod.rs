//! Candlestick pattern recognition.
//!
//! Each detector returns +100 for a bullish match, -100 for a bearish match
//! and 0 otherwise; indices without enough prior candles are NaN. Body and
//! shadow thresholds are fractions of the candle's own range:
//!
//! | shape              | rule                    |
//! |--------------------|-------------------------|
//! | doji               | body <= 10% of range    |
//! | short body         | body <= 30% of range    |
//! | long body          | body >= 50% of range    |
//! | very short shadow  | shadow <= 10% of range  |
//! | marubozu           | both shadows <= 5%      |
//!
//! Prices are "near" each other when they differ by at most 5% of the
//! reference candle's range.
//!
//! Detectors are grouped by how many candles the pattern spans.

mod double;
mod multi;
mod single;
mod triple;

pub use double::{
    cdl_counterattack, cdl_dark_cloud_cover, cdl_doji_star, cdl_engulfing, cdl_hanging_man,
    cdl_harami, cdl_harami_cross, cdl_homing_pigeon, cdl_in_neck, cdl_inverted_hammer,
    cdl_kicking, cdl_kicking_by_length, cdl_matching_low, cdl_on_neck, cdl_piercing,
    cdl_separating_lines, cdl_thrusting,
};
pub use multi::{
    cdl_3_line_strike, cdl_breakaway, cdl_conceal_baby_swallow, cdl_hikkake_mod,
    cdl_ladder_bottom, cdl_mat_hold, cdl_rise_fall_3_methods,
};
pub use single::{
    cdl_belt_hold, cdl_closing_marubozu, cdl_doji, cdl_dragonfly_doji, cdl_gravestone_doji,
    cdl_hammer, cdl_high_wave, cdl_long_legged_doji, cdl_long_line, cdl_marubozu,
    cdl_rickshaw_man, cdl_short_line, cdl_shooting_star, cdl_spinning_top, cdl_takuri,
};
pub use triple::{
    cdl_2_crows, cdl_3_black_crows, cdl_3_inside, cdl_3_outside, cdl_3_stars_in_south,
    cdl_3_white_soldiers, cdl_abandoned_baby, cdl_advance_block, cdl_evening_doji_star,
    cdl_evening_star, cdl_gap_side_side_white, cdl_hikkake, cdl_identical_3_crows,
    cdl_morning_doji_star, cdl_morning_star, cdl_stalled_pattern, cdl_stick_sandwich,
    cdl_tasuki_gap, cdl_tristar, cdl_unique_3_river, cdl_upside_gap_2_crows,
    cdl_xside_gap_3_methods,
};

pub(crate) const BULLISH: f64 = 100.0;
pub(crate) const BEARISH: f64 = -100.0;
pub(crate) const NONE: f64 = 0.0;

/// One OHLC candle with derived geometry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    pub fn body_mid(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// +100 for a white (or flat) candle, -100 for a black one.
    pub fn colour(&self) -> f64 {
        if self.close >= self.open {
            BULLISH
        } else {
            BEARISH
        }
    }

    pub fn is_long(&self) -> bool {
        self.range() > 0.0 && self.body() >= 0.5 * self.range()
    }

    pub fn is_short(&self) -> bool {
        self.range() > 0.0 && self.body() <= 0.3 * self.range()
    }

    pub fn is_doji(&self) -> bool {
        self.range() > 0.0 && self.body() <= 0.1 * self.range()
    }

    pub fn has_short_upper_shadow(&self) -> bool {
        self.upper_shadow() <= 0.1 * self.range()
    }

    pub fn has_short_lower_shadow(&self) -> bool {
        self.lower_shadow() <= 0.1 * self.range()
    }

    pub fn is_marubozu(&self) -> bool {
        let r = self.range();
        r > 0.0
            && self.body() > 0.0
            && self.upper_shadow() <= 0.05 * r
            && self.lower_shadow() <= 0.05 * r
    }

    /// Real body entirely above `prev`'s real body.
    pub fn gaps_up_from(&self, prev: &Candle) -> bool {
        self.body_bottom() > prev.body_top()
    }

    /// Real body entirely below `prev`'s real body.
    pub fn gaps_down_from(&self, prev: &Candle) -> bool {
        self.body_top() < prev.body_bottom()
    }

    /// Real body strictly inside `outer`'s real body.
    pub fn body_inside(&self, outer: &Candle) -> bool {
        self.body_top() < outer.body_top() && self.body_bottom() > outer.body_bottom()
    }

    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }
}

/// `a` and `b` differ by at most 5% of `reference`'s range.
pub(crate) fn near(a: f64, b: f64, reference: &Candle) -> bool {
    (a - b).abs() <= 0.05 * reference.range()
}

pub(crate) fn signal(bullish: bool) -> f64 {
    if bullish {
        BULLISH
    } else {
        BEARISH
    }
}

/// Run a detector over every index with `span` candles ending there.
pub(crate) fn scan<F>(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    span: usize,
    detect: F,
) -> Vec<f64>
where
    F: Fn(&[Candle]) -> f64,
{
    let n = open.len().min(high.len()).min(low.len()).min(close.len());
    let candles: Vec<Candle> = (0..n)
        .map(|i| Candle {
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
        })
        .collect();

    let mut result = vec![f64::NAN; n];
    if span == 0 || n < span {
        return result;
    }
    for i in (span - 1)..n {
        let window = &candles[(i + 1 - span)..=i];
        if window.iter().any(Candle::is_void) {
            continue;
        }
        result[i] = detect(window);
    }
    result
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Split (open, high, low, close) rows into columns.
    pub fn cols(rows: &[(f64, f64, f64, f64)]) -> [Vec<f64>; 4] {
        [
            rows.iter().map(|r| r.0).collect(),
            rows.iter().map(|r| r.1).collect(),
            rows.iter().map(|r| r.2).collect(),
            rows.iter().map(|r| r.3).collect(),
        ]
    }

    /// Last value of a detector over `rows`.
    pub fn last(
        kernel: fn(&[f64], &[f64], &[f64], &[f64]) -> Vec<f64>,
        rows: &[(f64, f64, f64, f64)],
    ) -> f64 {
        let [o, h, l, c] = cols(rows);
        *kernel(&o, &h, &l, &c).last().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::cols;
    use super::*;

    #[test]
    fn void_candle_is_nan() {
        let [o, h, l, c] = cols(&[(f64::NAN, 12.0, 8.0, 10.0)]);
        assert!(cdl_doji(&o, &h, &l, &c)[0].is_nan());
    }

    #[test]
    fn short_history_is_nan() {
        let [o, h, l, c] = cols(&[(10.0, 11.0, 9.0, 10.5), (10.5, 11.0, 9.0, 10.0)]);
        assert!(cdl_3_inside(&o, &h, &l, &c).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn candle_geometry() {
        let c = Candle {
            open: 10.0,
            high: 15.0,
            low: 9.0,
            close: 14.0,
        };
        assert_eq!(c.body(), 4.0);
        assert_eq!(c.upper_shadow(), 1.0);
        assert_eq!(c.lower_shadow(), 1.0);
        assert!(c.is_long());
        assert!(!c.is_short());
        assert_eq!(c.colour(), BULLISH);
    }
}
