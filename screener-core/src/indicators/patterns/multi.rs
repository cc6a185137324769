//! Four- and five-candle patterns. `w[0]` is the earliest candle.

use super::{scan, Candle, BULLISH, BEARISH, NONE};

/// Three candles of one colour stepping in one direction, then a candle of
/// the other colour wiping out the run.
pub fn cdl_3_line_strike(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 4, |w| {
        let (run, strike) = (&w[..3], w[3]);
        let rising = run.iter().all(Candle::is_bullish)
            && run[1].close > run[0].close
            && run[2].close > run[1].close;
        let falling = run.iter().all(Candle::is_bearish)
            && run[1].close < run[0].close
            && run[2].close < run[1].close;
        if rising
            && strike.is_bearish()
            && strike.open > run[2].close
            && strike.close < run[0].open
        {
            BULLISH
        } else if falling
            && strike.is_bullish()
            && strike.open < run[2].close
            && strike.close > run[0].open
        {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Two black marubozu, a black candle gapping down whose upper shadow
/// reaches back into the second, then a black candle engulfing it.
pub fn cdl_conceal_baby_swallow(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
) -> Vec<f64> {
    scan(open, high, low, close, 4, |w| {
        let (a, b, c, d) = (w[0], w[1], w[2], w[3]);
        let matched = a.is_bearish()
            && a.is_marubozu()
            && b.is_bearish()
            && b.is_marubozu()
            && c.is_bearish()
            && c.open < b.close
            && c.high > b.close
            && d.is_bearish()
            && d.high > c.high
            && d.low < c.low;
        if matched {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Two nested inside bars, the second closing near the far end of the
/// first inside bar, followed by a false breakout.
pub fn cdl_hikkake_mod(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 4, |w| {
        let (a, b, c, d) = (w[0], w[1], w[2], w[3]);
        let nested = b.high < a.high && b.low > a.low && c.high < b.high && c.low > b.low;
        if !nested {
            return NONE;
        }
        let quarter = 0.25 * b.range();
        if c.close <= b.low + quarter && d.high < c.high && d.low < c.low {
            BULLISH
        } else if c.close >= b.high - quarter && d.high > c.high && d.low > c.low {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Long candle, a gap, two more steps the same way, then a reversal candle
/// closing inside the gap.
pub fn cdl_breakaway(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 5, |w| {
        let (a, b, c, d, e) = (w[0], w[1], w[2], w[3], w[4]);
        if !a.is_long() {
            return NONE;
        }
        if a.is_bearish()
            && b.is_bearish()
            && b.gaps_down_from(&a)
            && c.close < b.close
            && d.close < c.close
            && e.is_bullish()
            && e.close > b.open
            && e.close < a.close
        {
            BULLISH
        } else if a.is_bullish()
            && b.is_bullish()
            && b.gaps_up_from(&a)
            && c.close > b.close
            && d.close > c.close
            && e.is_bearish()
            && e.close < b.open
            && e.close > a.close
        {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Four descending black candles, the last with a long upper shadow, then a
/// white candle opening above its body and closing above its high.
pub fn cdl_ladder_bottom(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 5, |w| {
        let (steps, e) = (&w[..4], w[4]);
        let d = steps[3];
        let descending = steps.iter().all(Candle::is_bearish)
            && steps
                .windows(2)
                .all(|pair| pair[1].open < pair[0].open && pair[1].close < pair[0].close);
        let matched = descending
            && d.upper_shadow() >= 0.3 * d.range()
            && e.is_bullish()
            && e.open > d.body_top()
            && e.close > d.high;
        if matched {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Long white, three small bodies gapping up and holding above `penetration`
/// of the first body, then a white candle closing above them all.
pub fn cdl_mat_hold(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    penetration: f64,
) -> Vec<f64> {
    scan(open, high, low, close, 5, |w| {
        let (a, pause, e) = (w[0], &w[1..4], w[4]);
        if !(a.is_long() && a.is_bullish()) {
            return NONE;
        }
        let floor = a.close - a.body() * penetration;
        let holds = pause[0].gaps_up_from(&a)
            && pause
                .iter()
                .all(|c| c.body() <= 0.5 * a.body() && c.body_bottom() > floor);
        let ceiling = pause.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        if holds && e.is_bullish() && e.open > pause[2].close && e.close > ceiling {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Long candle, three small counter-moving candles inside its range, then a
/// long candle resuming the trend past the first close.
pub fn cdl_rise_fall_3_methods(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
) -> Vec<f64> {
    scan(open, high, low, close, 5, |w| {
        let (a, pause, e) = (w[0], &w[1..4], w[4]);
        if !(a.is_long() && e.is_long()) {
            return NONE;
        }
        let contained = pause
            .iter()
            .all(|c| c.body() <= 0.5 * a.body() && c.high < a.high && c.low > a.low);
        if !contained {
            return NONE;
        }
        let drifting_down = pause.windows(2).all(|pair| pair[1].close < pair[0].close);
        let drifting_up = pause.windows(2).all(|pair| pair[1].close > pair[0].close);
        if a.is_bullish()
            && drifting_down
            && e.is_bullish()
            && e.open > pause[2].close
            && e.close > a.close
        {
            BULLISH
        } else if a.is_bearish()
            && drifting_up
            && e.is_bearish()
            && e.open < pause[2].close
            && e.close < a.close
        {
            BEARISH
        } else {
            NONE
        }
    })
}
