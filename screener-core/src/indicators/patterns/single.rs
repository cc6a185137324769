//! One-candle shapes. Short line also looks back at the ten candles before it.

use super::{scan, BULLISH, BEARISH, NONE};

pub fn cdl_doji(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| if w[0].is_doji() { BULLISH } else { NONE })
}

/// Doji with almost no upper shadow and a long lower one.
pub fn cdl_dragonfly_doji(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        if c.is_doji() && c.has_short_upper_shadow() && c.lower_shadow() >= 0.6 * c.range() {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Doji with almost no lower shadow and a long upper one.
pub fn cdl_gravestone_doji(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        if c.is_doji() && c.has_short_lower_shadow() && c.upper_shadow() >= 0.6 * c.range() {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Dragonfly doji whose lower shadow spans at least 80% of the range.
pub fn cdl_takuri(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        if c.is_doji() && c.has_short_upper_shadow() && c.lower_shadow() >= 0.8 * c.range() {
            BULLISH
        } else {
            NONE
        }
    })
}

pub fn cdl_long_legged_doji(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        let r = c.range();
        if c.is_doji() && c.upper_shadow() >= 0.3 * r && c.lower_shadow() >= 0.3 * r {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Long-legged doji with its body near the middle of the range.
pub fn cdl_rickshaw_man(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        let r = c.range();
        let centred = (c.body_mid() - (c.high + c.low) / 2.0).abs() <= 0.1 * r;
        if c.is_doji() && c.upper_shadow() >= 0.3 * r && c.lower_shadow() >= 0.3 * r && centred {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Small body at the top of the range with a long lower shadow.
pub fn cdl_hammer(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        if c.body() > 0.0
            && c.is_short()
            && c.lower_shadow() >= 2.0 * c.body()
            && c.has_short_upper_shadow()
        {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Small body at the bottom of the range with a long upper shadow.
pub fn cdl_shooting_star(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        if c.body() > 0.0
            && c.is_short()
            && c.upper_shadow() >= 2.0 * c.body()
            && c.has_short_lower_shadow()
        {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Body with (almost) no shadows on either side.
pub fn cdl_marubozu(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        if c.is_marubozu() {
            c.colour()
        } else {
            NONE
        }
    })
}

/// Long body with no shadow on the closing side.
pub fn cdl_closing_marubozu(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        if !c.is_long() {
            NONE
        } else if c.is_bullish() && c.has_short_upper_shadow() {
            BULLISH
        } else if c.is_bearish() && c.has_short_lower_shadow() {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Long body with no shadow on the opening side.
pub fn cdl_belt_hold(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        if !c.is_long() {
            NONE
        } else if c.is_bullish() && c.has_short_lower_shadow() {
            BULLISH
        } else if c.is_bearish() && c.has_short_upper_shadow() {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Short body with both shadows at least 30% of the range.
pub fn cdl_high_wave(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        let r = c.range();
        if c.is_short() && c.upper_shadow() >= 0.3 * r && c.lower_shadow() >= 0.3 * r {
            c.colour()
        } else {
            NONE
        }
    })
}

/// Short, non-empty body with both shadows longer than it.
pub fn cdl_spinning_top(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        let b = c.body();
        if b > 0.0 && c.is_short() && c.upper_shadow() > b && c.lower_shadow() > b {
            c.colour()
        } else {
            NONE
        }
    })
}

pub fn cdl_long_line(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 1, |w| {
        let c = w[0];
        let r = c.range();
        if r > 0.0
            && c.body() >= 0.6 * r
            && c.upper_shadow() <= 0.2 * r
            && c.lower_shadow() <= 0.2 * r
        {
            c.colour()
        } else {
            NONE
        }
    })
}

/// Candle spanning at most half the average range of the ten before it.
pub fn cdl_short_line(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 11, |w| {
        let (history, c) = (&w[..10], w[10]);
        let avg_range = history.iter().map(|h| h.range()).sum::<f64>() / 10.0;
        if c.body() > 0.0 && c.range() <= 0.5 * avg_range {
            c.colour()
        } else {
            NONE
        }
    })
}
