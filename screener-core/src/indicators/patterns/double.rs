//! Two-candle patterns. `w[0]` is the earlier candle.

use super::{near, scan, signal, Candle, BULLISH, BEARISH, NONE};

fn hammer_shape(c: &Candle) -> bool {
    c.body() > 0.0
        && c.is_short()
        && c.lower_shadow() >= 2.0 * c.body()
        && c.has_short_upper_shadow()
}

fn inverted_hammer_shape(c: &Candle) -> bool {
    c.body() > 0.0
        && c.is_short()
        && c.upper_shadow() >= 2.0 * c.body()
        && c.has_short_lower_shadow()
}

/// Long black candle followed by a white one opening below its low.
fn neck_setup(prev: &Candle, cur: &Candle) -> bool {
    prev.is_long() && prev.is_bearish() && cur.is_bullish() && cur.open < prev.low
}

/// Second body engulfs the first body with opposite colour.
pub fn cdl_engulfing(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        let engulfs = cur.body_top() >= prev.body_top()
            && cur.body_bottom() <= prev.body_bottom()
            && cur.body() > prev.body();
        if !engulfs {
            NONE
        } else if prev.is_bearish() && cur.is_bullish() {
            BULLISH
        } else if prev.is_bullish() && cur.is_bearish() {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Long first body containing a smaller, opposite-coloured second body.
pub fn cdl_harami(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        if !(prev.is_long() && cur.body_inside(&prev)) {
            NONE
        } else if prev.is_bearish() && cur.is_bullish() {
            BULLISH
        } else if prev.is_bullish() && cur.is_bearish() {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Harami whose second candle is a doji.
pub fn cdl_harami_cross(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        let inside = cur.body_top() < prev.body_top() && cur.body_bottom() > prev.body_bottom();
        if prev.is_long() && cur.is_doji() && inside && prev.body() > 0.0 {
            signal(prev.is_bearish())
        } else {
            NONE
        }
    })
}

/// Long candle, then a doji gapping away in the same direction.
pub fn cdl_doji_star(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        if !(prev.is_long() && cur.is_doji()) {
            NONE
        } else if prev.is_bullish() && cur.gaps_up_from(&prev) {
            BEARISH
        } else if prev.is_bearish() && cur.gaps_down_from(&prev) {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Long white candle, then a black one opening above its high and closing
/// more than `penetration` of the way down its body.
pub fn cdl_dark_cloud_cover(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    penetration: f64,
) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        let matched = prev.is_long()
            && prev.is_bullish()
            && cur.is_bearish()
            && cur.open > prev.high
            && cur.close < prev.close - prev.body() * penetration
            && cur.close > prev.open;
        if matched {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Long black candle, then a long white one opening below its low and
/// closing above the middle of its body.
pub fn cdl_piercing(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        let matched = prev.is_long()
            && prev.is_bearish()
            && cur.is_long()
            && cur.is_bullish()
            && cur.open < prev.low
            && cur.close > prev.body_mid()
            && cur.close < prev.open;
        if matched {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Two long opposite-coloured candles closing at the same price.
pub fn cdl_counterattack(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        let opposite =
            (prev.is_bullish() && cur.is_bearish()) || (prev.is_bearish() && cur.is_bullish());
        if prev.is_long() && cur.is_long() && opposite && near(cur.close, prev.close, &prev) {
            cur.colour()
        } else {
            NONE
        }
    })
}

/// Long black candle, then a smaller black body inside it.
pub fn cdl_homing_pigeon(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        let matched = prev.is_long()
            && prev.is_bearish()
            && cur.is_bearish()
            && cur.body() <= 0.5 * prev.body()
            && cur.body_inside(&prev);
        if matched {
            BULLISH
        } else {
            NONE
        }
    })
}

/// White candle closing just inside the prior black body.
pub fn cdl_in_neck(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        let matched = neck_setup(&prev, &cur)
            && cur.close >= prev.close
            && cur.close <= prev.close + 0.1 * prev.body();
        if matched {
            BEARISH
        } else {
            NONE
        }
    })
}

/// White candle closing at the prior black candle's low.
pub fn cdl_on_neck(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        if neck_setup(&prev, &cur) && near(cur.close, prev.low, &prev) {
            BEARISH
        } else {
            NONE
        }
    })
}

/// White candle closing into, but not past the middle of, the prior black body.
pub fn cdl_thrusting(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        let matched = neck_setup(&prev, &cur)
            && cur.close > prev.close + 0.1 * prev.body()
            && cur.close <= prev.body_mid();
        if matched {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Opposite-coloured marubozu pair separated by a gap. Returns the gap
/// direction when matched.
fn kick(prev: &Candle, cur: &Candle) -> Option<bool> {
    if !(prev.is_marubozu() && cur.is_marubozu()) {
        return None;
    }
    if prev.is_bearish() && cur.is_bullish() && cur.low > prev.high {
        Some(true)
    } else if prev.is_bullish() && cur.is_bearish() && cur.high < prev.low {
        Some(false)
    } else {
        None
    }
}

pub fn cdl_kicking(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| match kick(&w[0], &w[1]) {
        Some(up) => signal(up),
        None => NONE,
    })
}

/// Kicking, signed by the colour of the longer marubozu.
pub fn cdl_kicking_by_length(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        match kick(&prev, &cur) {
            Some(_) if cur.body() >= prev.body() => cur.colour(),
            Some(_) => prev.colour(),
            None => NONE,
        }
    })
}

/// Two black candles closing at the same price.
pub fn cdl_matching_low(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        if prev.is_bearish() && cur.is_bearish() && near(cur.close, prev.close, &prev) {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Opposite colours opening at the same price, the second one long.
pub fn cdl_separating_lines(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        if !(cur.is_long() && near(cur.open, prev.open, &prev)) {
            NONE
        } else if prev.is_bearish() && cur.is_bullish() {
            BULLISH
        } else if prev.is_bullish() && cur.is_bearish() {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Hammer shape sitting on top of the prior body.
pub fn cdl_hanging_man(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        if hammer_shape(&cur) && cur.body_bottom() >= prev.body_top() {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Inverted hammer shape gapping below the prior body.
pub fn cdl_inverted_hammer(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 2, |w| {
        let (prev, cur) = (w[0], w[1]);
        if inverted_hammer_shape(&cur) && cur.gaps_down_from(&prev) {
            BULLISH
        } else {
            NONE
        }
    })
}
