//! Three-candle patterns. `w[0]` is the earliest candle.

use super::{near, scan, signal, Candle, BULLISH, BEARISH, NONE};

/// Star setup shared by the morning and evening families. Returns the
/// direction of a match.
fn star(w: &[Candle], penetration: f64, doji: bool) -> Option<bool> {
    let (first, star, last) = (w[0], w[1], w[2]);
    if !first.is_long() || star.body() > 0.3 * first.body() || (doji && !star.is_doji()) {
        return None;
    }
    let reach = first.body() * penetration;
    if first.is_bearish()
        && star.body_top() < first.close
        && last.is_bullish()
        && last.close > first.close + reach
    {
        Some(true)
    } else if first.is_bullish()
        && star.body_bottom() > first.close
        && last.is_bearish()
        && last.close < first.close - reach
    {
        Some(false)
    } else {
        None
    }
}

fn star_kernel(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    penetration: f64,
    doji: bool,
    bullish: bool,
) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| match star(w, penetration, doji) {
        Some(up) if up == bullish => signal(up),
        _ => NONE,
    })
}

pub fn cdl_morning_star(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    penetration: f64,
) -> Vec<f64> {
    star_kernel(open, high, low, close, penetration, false, true)
}

pub fn cdl_evening_star(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    penetration: f64,
) -> Vec<f64> {
    star_kernel(open, high, low, close, penetration, false, false)
}

pub fn cdl_morning_doji_star(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    penetration: f64,
) -> Vec<f64> {
    star_kernel(open, high, low, close, penetration, true, true)
}

pub fn cdl_evening_doji_star(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    penetration: f64,
) -> Vec<f64> {
    star_kernel(open, high, low, close, penetration, true, false)
}

/// Star whose shadows also gap away from both neighbours.
pub fn cdl_abandoned_baby(
    open: &[f64],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    penetration: f64,
) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (first, baby, last) = (w[0], w[1], w[2]);
        if !(first.is_long() && baby.is_doji()) {
            return NONE;
        }
        let reach = first.body() * penetration;
        if first.is_bearish()
            && baby.high < first.low
            && last.is_bullish()
            && last.low > baby.high
            && last.close > first.close + reach
        {
            BULLISH
        } else if first.is_bullish()
            && baby.low > first.high
            && last.is_bearish()
            && last.high < baby.low
            && last.close < first.close - reach
        {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Three steady candles of one colour, each opening inside the previous
/// body with little shadow at the closing end.
fn three_in_a_row(w: &[Candle], bullish: bool) -> bool {
    w.windows(2).all(|pair| {
        let (prev, cur) = (pair[0], pair[1]);
        if bullish {
            cur.close > prev.close && cur.open > prev.open && cur.open <= prev.close
        } else {
            cur.close < prev.close && cur.open < prev.open && cur.open >= prev.close
        }
    }) && w.iter().all(|c| {
        let closing_shadow = if bullish { c.upper_shadow() } else { c.lower_shadow() };
        let coloured = if bullish { c.is_bullish() } else { c.is_bearish() };
        coloured && closing_shadow <= 0.2 * c.range()
    })
}

pub fn cdl_3_white_soldiers(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| if three_in_a_row(w, true) { BULLISH } else { NONE })
}

pub fn cdl_3_black_crows(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| if three_in_a_row(w, false) { BEARISH } else { NONE })
}

/// Three long black candles, each opening at the previous close.
pub fn cdl_identical_3_crows(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let all_long_black = w
            .iter()
            .all(|c| c.is_bearish() && c.is_long() && c.has_short_lower_shadow());
        let chained = w.windows(2).all(|pair| {
            let (prev, cur) = (pair[0], pair[1]);
            cur.close < prev.close && near(cur.open, prev.close, &prev)
        });
        if all_long_black && chained {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Long white, then a black body gapping up, then a black candle opening
/// inside the second body and closing inside the first.
pub fn cdl_2_crows(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let matched = a.is_long()
            && a.is_bullish()
            && b.is_bearish()
            && b.gaps_up_from(&a)
            && c.is_bearish()
            && c.open < b.open
            && c.open > b.close
            && c.close > a.open
            && c.close < a.close;
        if matched {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Like two crows, but the third candle engulfs the second and stays above
/// the first close.
pub fn cdl_upside_gap_2_crows(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let matched = a.is_long()
            && a.is_bullish()
            && b.is_bearish()
            && b.gaps_up_from(&a)
            && c.is_bearish()
            && c.open > b.open
            && c.close < b.close
            && c.close > a.close;
        if matched {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Harami confirmed by a close beyond the first open.
pub fn cdl_3_inside(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        if !(a.is_long() && b.body_inside(&a)) {
            NONE
        } else if a.is_bearish() && b.is_bullish() && c.close > a.open {
            BULLISH
        } else if a.is_bullish() && b.is_bearish() && c.close < a.open {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Engulfing confirmed by a close beyond the engulfing close.
pub fn cdl_3_outside(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let engulfs = b.body_top() >= a.body_top()
            && b.body_bottom() <= a.body_bottom()
            && b.body() > a.body();
        if !engulfs {
            NONE
        } else if a.is_bearish() && b.is_bullish() && c.close > b.close {
            BULLISH
        } else if a.is_bullish() && b.is_bearish() && c.close < b.close {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Three shrinking black candles with rising lows, the last a small marubozu
/// inside the second's range.
pub fn cdl_3_stars_in_south(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let matched = a.is_bearish()
            && a.is_long()
            && a.lower_shadow() >= 0.3 * a.range()
            && b.is_bearish()
            && b.body() < a.body()
            && b.low > a.low
            && b.lower_shadow() > 0.0
            && c.is_bearish()
            && c.has_short_upper_shadow()
            && c.has_short_lower_shadow()
            && c.high <= b.high
            && c.low >= b.low;
        if matched {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Rising white candles with shrinking bodies and a topping upper shadow.
pub fn cdl_advance_block(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let climbing = w.iter().all(Candle::is_bullish)
            && a.is_long()
            && b.open > a.open
            && b.open <= a.close
            && c.open > b.open
            && c.open <= b.close
            && b.close > a.close
            && c.close > b.close;
        let tiring = b.body() < a.body()
            && c.body() < b.body()
            && c.upper_shadow() >= 0.5 * c.body();
        if climbing && tiring {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Two similar white candles side by side after a gap.
pub fn cdl_gap_side_side_white(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let twins = b.is_bullish()
            && c.is_bullish()
            && (c.body() - b.body()).abs() <= 0.2 * b.body()
            && near(c.open, b.open, &b);
        if !twins {
            NONE
        } else if b.gaps_up_from(&a) && c.gaps_up_from(&a) {
            BULLISH
        } else if b.gaps_down_from(&a) && c.gaps_down_from(&a) {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Inside bar followed by a false breakout.
pub fn cdl_hikkake(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        if !(b.high < a.high && b.low > a.low) {
            NONE
        } else if c.high < b.high && c.low < b.low {
            BULLISH
        } else if c.high > b.high && c.low > b.low {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Two long white candles, then a small one riding on the second's close.
pub fn cdl_stalled_pattern(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let matched = w.iter().all(Candle::is_bullish)
            && a.is_long()
            && b.is_long()
            && b.has_short_upper_shadow()
            && b.close > a.close
            && c.close > b.close
            && c.body() <= 0.5 * b.body()
            && near(c.open, b.close, &b);
        if matched {
            BEARISH
        } else {
            NONE
        }
    })
}

/// Black, white above the first close, black closing where the first did.
pub fn cdl_stick_sandwich(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let matched = a.is_bearish()
            && b.is_bullish()
            && b.low > a.close
            && c.is_bearish()
            && near(c.close, a.close, &a);
        if matched {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Gap continuation where the third candle opens inside the second body.
/// `into_first` selects where it must close: inside the gap (tasuki) or
/// inside the first body (side gap three methods).
fn gap_reaction(w: &[Candle], into_first: bool) -> f64 {
    let (a, b, c) = (w[0], w[1], w[2]);
    let closes_into = |lo: f64, hi: f64| c.close > lo && c.close < hi;
    if a.is_bullish() && b.is_bullish() && b.gaps_up_from(&a) && c.is_bearish() {
        let opens_inside = c.open > b.open && c.open < b.close;
        let target = if into_first {
            closes_into(a.open, a.close)
        } else {
            closes_into(a.close, b.open)
        };
        if opens_inside && target {
            return BULLISH;
        }
    }
    if a.is_bearish() && b.is_bearish() && b.gaps_down_from(&a) && c.is_bullish() {
        let opens_inside = c.open < b.open && c.open > b.close;
        let target = if into_first {
            closes_into(a.close, a.open)
        } else {
            closes_into(b.open, a.close)
        };
        if opens_inside && target {
            return BEARISH;
        }
    }
    NONE
}

pub fn cdl_tasuki_gap(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| gap_reaction(w, false))
}

pub fn cdl_xside_gap_3_methods(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| gap_reaction(w, true))
}

/// Three dojis with the middle one gapping away.
pub fn cdl_tristar(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        if !w.iter().all(Candle::is_doji) {
            NONE
        } else if b.gaps_up_from(&a) && c.body_top() < b.body_top() {
            BEARISH
        } else if b.gaps_down_from(&a) && c.body_bottom() > b.body_bottom() {
            BULLISH
        } else {
            NONE
        }
    })
}

/// Long black, a black harami reaching a new low, then a small white candle
/// below the second close.
pub fn cdl_unique_3_river(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    scan(open, high, low, close, 3, |w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let matched = a.is_long()
            && a.is_bearish()
            && b.is_bearish()
            && b.close > a.close
            && b.open <= a.open
            && b.low < a.low
            && c.is_bullish()
            && c.body() < b.body()
            && c.open > b.low
            && c.close < b.close;
        if matched {
            BULLISH
        } else {
            NONE
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::patterns::test_support::{cols, last};

    const LONG_BLACK: (f64, f64, f64, f64) = (20.0, 20.5, 9.5, 10.0);
    const LONG_WHITE: (f64, f64, f64, f64) = (10.0, 20.5, 9.5, 20.0);

    #[test]
    fn soldiers_and_crows() {
        let soldiers = [
            (10.0, 12.1, 9.9, 12.0),
            (11.5, 14.1, 11.4, 14.0),
            (13.5, 16.1, 13.4, 16.0),
        ];
        assert_eq!(last(cdl_3_white_soldiers, &soldiers), 100.0);

        let crows = [
            (16.0, 16.1, 13.9, 14.0),
            (14.5, 14.6, 11.9, 12.0),
            (12.5, 12.6, 9.9, 10.0),
        ];
        assert_eq!(last(cdl_3_black_crows, &crows), -100.0);
    }

    #[test]
    fn identical_crows_open_at_prior_close() {
        let rows = [
            (20.0, 20.2, 14.9, 15.0),
            (15.05, 15.1, 10.0, 10.1),
            (10.1, 10.2, 5.0, 5.1),
        ];
        assert_eq!(last(cdl_identical_3_crows, &rows), -100.0);
    }

    #[test]
    fn morning_and_evening_star() {
        let [o, h, l, c] = cols(&[
            (20.0, 20.2, 11.8, 12.0),
            (11.0, 11.5, 10.0, 10.8),
            (11.5, 18.2, 11.4, 18.0),
        ]);
        assert_eq!(cdl_morning_star(&o, &h, &l, &c, 0.3)[2], 100.0);
        assert_eq!(cdl_morning_star(&o, &h, &l, &c, 0.9)[2], 0.0);
        // Star body too wide for a doji.
        assert_eq!(cdl_morning_doji_star(&o, &h, &l, &c, 0.3)[2], 0.0);

        let [o, h, l, c] = cols(&[
            (12.0, 20.2, 11.8, 20.0),
            (21.0, 22.0, 20.5, 21.2),
            (20.5, 20.6, 13.8, 14.0),
        ]);
        assert_eq!(cdl_evening_star(&o, &h, &l, &c, 0.3)[2], -100.0);
        assert_eq!(cdl_morning_star(&o, &h, &l, &c, 0.3)[2], 0.0);
    }

    #[test]
    fn doji_star_variant() {
        let [o, h, l, c] = cols(&[
            (20.0, 20.2, 11.8, 12.0),
            (11.0, 11.5, 10.0, 10.95),
            (11.5, 18.2, 11.4, 18.0),
        ]);
        assert_eq!(cdl_morning_doji_star(&o, &h, &l, &c, 0.3)[2], 100.0);
        assert_eq!(cdl_evening_doji_star(&o, &h, &l, &c, 0.3)[2], 0.0);
    }

    #[test]
    fn abandoned_baby_needs_shadow_gaps() {
        let [o, h, l, c] = cols(&[LONG_BLACK, (9.0, 9.2, 8.8, 9.02), (10.0, 18.0, 9.8, 17.5)]);
        assert_eq!(cdl_abandoned_baby(&o, &h, &l, &c, 0.3)[2], 100.0);

        // Baby's high overlaps the first low.
        let [o, h, l, c] = cols(&[LONG_BLACK, (9.0, 9.6, 8.8, 9.02), (10.0, 18.0, 9.8, 17.5)]);
        assert_eq!(cdl_abandoned_baby(&o, &h, &l, &c, 0.3)[2], 0.0);
    }

    #[test]
    fn two_crows_variants() {
        let two = [LONG_WHITE, (22.0, 23.0, 20.5, 21.0), (21.5, 22.0, 14.5, 15.0)];
        assert_eq!(last(cdl_2_crows, &two), -100.0);
        assert_eq!(last(cdl_upside_gap_2_crows, &two), 0.0);

        let upside = [LONG_WHITE, (22.0, 23.0, 20.5, 21.0), (22.5, 23.0, 20.2, 20.5)];
        assert_eq!(last(cdl_upside_gap_2_crows, &upside), -100.0);
        assert_eq!(last(cdl_2_crows, &upside), 0.0);
    }

    #[test]
    fn inside_and_outside_confirmations() {
        let inside = [LONG_BLACK, (13.0, 16.0, 12.0, 15.0), (15.0, 22.0, 14.5, 21.0)];
        assert_eq!(last(cdl_3_inside, &inside), 100.0);

        let outside = [
            (11.0, 11.5, 9.5, 10.0),
            (9.8, 12.0, 9.5, 11.5),
            (11.6, 13.0, 11.5, 12.8),
        ];
        assert_eq!(last(cdl_3_outside, &outside), 100.0);
    }

    #[test]
    fn three_stars_in_south() {
        let rows = [
            (20.0, 20.5, 10.0, 14.0),
            (16.0, 16.5, 12.0, 13.5),
            (13.8, 13.85, 12.55, 12.6),
        ];
        assert_eq!(last(cdl_3_stars_in_south, &rows), 100.0);
    }

    #[test]
    fn advance_block_and_stalled() {
        let block = [
            (10.0, 16.2, 9.9, 16.0),
            (13.0, 19.0, 12.9, 18.0),
            (17.0, 21.0, 16.9, 19.0),
        ];
        assert_eq!(last(cdl_advance_block, &block), -100.0);

        let stalled = [
            (10.0, 16.2, 9.9, 16.0),
            (15.0, 20.2, 14.9, 20.0),
            (20.1, 21.0, 19.9, 20.5),
        ];
        assert_eq!(last(cdl_stalled_pattern, &stalled), -100.0);
    }

    #[test]
    fn side_by_side_white_after_up_gap() {
        let rows = [
            (10.0, 15.5, 9.5, 15.0),
            (16.0, 18.2, 15.8, 18.0),
            (16.1, 18.3, 15.9, 18.05),
        ];
        assert_eq!(last(cdl_gap_side_side_white, &rows), 100.0);
    }

    #[test]
    fn hikkake_breaks_both_ways() {
        let base = [(10.0, 15.0, 8.0, 12.0), (11.0, 14.0, 9.0, 12.0)];
        let mut down = base.to_vec();
        down.push((11.0, 13.0, 7.0, 8.0));
        assert_eq!(last(cdl_hikkake, &down), 100.0);

        let mut up = base.to_vec();
        up.push((12.0, 16.0, 10.0, 15.0));
        assert_eq!(last(cdl_hikkake, &up), -100.0);
    }

    #[test]
    fn stick_sandwich_closes_match() {
        let rows = [
            (15.0, 15.5, 9.5, 10.0),
            (11.0, 14.5, 10.5, 14.0),
            (15.0, 15.2, 9.8, 10.05),
        ];
        assert_eq!(last(cdl_stick_sandwich, &rows), 100.0);
    }

    #[test]
    fn gap_reactions_split_on_close() {
        let tasuki = [
            (10.0, 15.5, 9.5, 15.0),
            (16.0, 19.0, 15.8, 18.5),
            (17.0, 17.5, 15.4, 15.5),
        ];
        assert_eq!(last(cdl_tasuki_gap, &tasuki), 100.0);
        assert_eq!(last(cdl_xside_gap_3_methods, &tasuki), 0.0);

        let xside = [
            (10.0, 15.5, 9.5, 15.0),
            (16.0, 19.0, 15.8, 18.5),
            (17.0, 17.5, 12.5, 13.0),
        ];
        assert_eq!(last(cdl_xside_gap_3_methods, &xside), 100.0);
        assert_eq!(last(cdl_tasuki_gap, &xside), 0.0);
    }

    #[test]
    fn tristar_top() {
        let rows = [
            (10.0, 11.0, 9.0, 10.05),
            (11.5, 12.5, 10.5, 11.55),
            (10.3, 11.3, 9.3, 10.35),
        ];
        assert_eq!(last(cdl_tristar, &rows), -100.0);
    }

    #[test]
    fn unique_three_river_bottom() {
        let rows = [LONG_BLACK, (15.0, 15.5, 8.0, 11.0), (9.0, 10.2, 8.8, 10.0)];
        assert_eq!(last(cdl_unique_3_river, &rows), 100.0);
    }
}
