//! Bounded and centred oscillators.
//!
//! WILLR, CCI, MFI, BOP, ULTOSC, the stochastic family, TRIX, and the
//! moving-average spreads (APO, PPO, MACD). All outputs align with their
//! inputs; zero denominators resolve to 0 rather than NaN.

use super::ema::{ema, moving_average, MaType};
use super::math::{rolling_max, rolling_min, rolling_sum};
use super::rolling;
use super::rsi::rsi;

fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

fn typical_price(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    high.iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| (h + l + c) / 3.0)
        .collect()
}

/// Williams %R = -100 * (HH - close) / (HH - LL).
pub fn willr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(high, period);
    let ll = rolling_min(low, period);
    (0..hh.len().min(ll.len()).min(close.len()))
        .map(|i| -100.0 * ratio_or_zero(hh[i] - close[i], hh[i] - ll[i]))
        .collect()
}

/// Commodity Channel Index = (TP - SMA(TP)) / (0.015 * mean deviation).
pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tp = typical_price(high, low, close);
    rolling(&tp, period, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let mean_dev = w.iter().map(|v| (v - mean).abs()).sum::<f64>() / n;
        let last = w[w.len() - 1];
        ratio_or_zero(last - mean, 0.015 * mean_dev)
    })
}

/// Money Flow Index: volume-weighted RSI over the typical price.
pub fn mfi(high: &[f64], low: &[f64], close: &[f64], volume: &[f64], period: usize) -> Vec<f64> {
    let tp = typical_price(high, low, close);
    let n = tp.len().min(volume.len());
    let mut positive = vec![f64::NAN; n];
    let mut negative = vec![f64::NAN; n];

    for i in 1..n {
        let flow = tp[i] * volume[i];
        let (pos, neg) = if tp[i] > tp[i - 1] {
            (flow, 0.0)
        } else if tp[i] < tp[i - 1] {
            (0.0, flow)
        } else {
            (0.0, 0.0)
        };
        positive[i] = pos;
        negative[i] = neg;
    }

    let pos_sum = rolling_sum(&positive, period);
    let neg_sum = rolling_sum(&negative, period);
    pos_sum
        .iter()
        .zip(&neg_sum)
        .map(|(p, m)| 100.0 * ratio_or_zero(*p, p + m))
        .collect()
}

/// Balance of Power = (close - open) / (high - low).
pub fn bop(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..open.len().min(high.len()).min(low.len()).min(close.len()))
        .map(|i| ratio_or_zero(close[i] - open[i], high[i] - low[i]))
        .collect()
}

/// Ultimate Oscillator over three buying-pressure windows, weighted 4:2:1.
pub fn ultosc(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    periods: (usize, usize, usize),
) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut buying = vec![f64::NAN; n];
    let mut range = vec![f64::NAN; n];

    for i in 1..n {
        let true_low = low[i].min(close[i - 1]);
        let true_high = high[i].max(close[i - 1]);
        buying[i] = close[i] - true_low;
        range[i] = true_high - true_low;
    }

    let average = |period: usize| -> Vec<f64> {
        let bp = rolling_sum(&buying, period);
        let tr = rolling_sum(&range, period);
        bp.iter().zip(&tr).map(|(b, t)| ratio_or_zero(*b, *t)).collect()
    };
    let (a1, a2, a3) = (average(periods.0), average(periods.1), average(periods.2));

    (0..n)
        .map(|i| 100.0 * (4.0 * a1[i] + 2.0 * a2[i] + a3[i]) / 7.0)
        .collect()
}

/// Raw stochastic %K = 100 * (close - LL) / (HH - LL).
fn raw_k(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(high, period);
    let ll = rolling_min(low, period);
    (0..hh.len().min(ll.len()).min(close.len()))
        .map(|i| 100.0 * ratio_or_zero(close[i] - ll[i], hh[i] - ll[i]))
        .collect()
}

/// Slow stochastic parameters.
#[derive(Debug, Clone, Copy)]
pub struct StochParams {
    pub fastk_period: usize,
    pub slowk_period: usize,
    pub slowk_ma: MaType,
    pub slowd_period: usize,
    pub slowd_ma: MaType,
}

/// Slow stochastic. Returns (slowk, slowd).
pub fn stoch(high: &[f64], low: &[f64], close: &[f64], params: &StochParams) -> (Vec<f64>, Vec<f64>) {
    let fastk = raw_k(high, low, close, params.fastk_period);
    let slowk = moving_average(&fastk, params.slowk_period, params.slowk_ma);
    let slowd = moving_average(&slowk, params.slowd_period, params.slowd_ma);
    (slowk, slowd)
}

/// Fast stochastic. Returns (fastk, fastd).
pub fn stochf(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    fastk_period: usize,
    fastd_period: usize,
    fastd_ma: MaType,
) -> (Vec<f64>, Vec<f64>) {
    let fastk = raw_k(high, low, close, fastk_period);
    let fastd = moving_average(&fastk, fastd_period, fastd_ma);
    (fastk, fastd)
}

/// Fast stochastic applied to RSI. Returns (fastk, fastd).
pub fn stochrsi(
    values: &[f64],
    timeperiod: usize,
    fastk_period: usize,
    fastd_period: usize,
    fastd_ma: MaType,
) -> (Vec<f64>, Vec<f64>) {
    let r = rsi(values, timeperiod);
    stochf(&r, &r, &r, fastk_period, fastd_period, fastd_ma)
}

/// TRIX: one-period percent change of a triple EMA.
pub fn trix(values: &[f64], period: usize) -> Vec<f64> {
    let e3 = ema(&ema(&ema(values, period), period), period);
    (0..e3.len())
        .map(|i| {
            if i == 0 || e3[i - 1].is_nan() || e3[i].is_nan() {
                f64::NAN
            } else {
                100.0 * ratio_or_zero(e3[i] - e3[i - 1], e3[i - 1])
            }
        })
        .collect()
}

/// Absolute Price Oscillator = MA(fast) - MA(slow).
pub fn apo(values: &[f64], fast: usize, slow: usize, ma_type: MaType) -> Vec<f64> {
    let f = moving_average(values, fast, ma_type);
    let s = moving_average(values, slow, ma_type);
    f.iter().zip(&s).map(|(a, b)| a - b).collect()
}

/// Percentage Price Oscillator = (MA(fast) - MA(slow)) / MA(slow) * 100.
pub fn ppo(values: &[f64], fast: usize, slow: usize, ma_type: MaType) -> Vec<f64> {
    let f = moving_average(values, fast, ma_type);
    let s = moving_average(values, slow, ma_type);
    f.iter()
        .zip(&s)
        .map(|(a, b)| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else {
                100.0 * ratio_or_zero(a - b, *b)
            }
        })
        .collect()
}

/// MACD with a moving-average type per leg.
#[derive(Debug, Clone, Copy)]
pub struct MacdParams {
    pub fast_period: usize,
    pub fast_ma: MaType,
    pub slow_period: usize,
    pub slow_ma: MaType,
    pub signal_period: usize,
    pub signal_ma: MaType,
}

impl MacdParams {
    /// All three legs exponential.
    pub fn classic(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            fast_ma: MaType::Ema,
            slow_period,
            slow_ma: MaType::Ema,
            signal_period,
            signal_ma: MaType::Ema,
        }
    }
}

/// Returns (macd, signal, histogram). Fast and slow legs are swapped if given
/// in the wrong order.
pub fn macd_ext(values: &[f64], params: &MacdParams) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let (mut fast, mut slow) = (
        (params.fast_period, params.fast_ma),
        (params.slow_period, params.slow_ma),
    );
    if slow.0 < fast.0 {
        std::mem::swap(&mut fast, &mut slow);
    }

    let f = moving_average(values, fast.0, fast.1);
    let s = moving_average(values, slow.0, slow.1);
    let line: Vec<f64> = f.iter().zip(&s).map(|(a, b)| a - b).collect();
    let signal = moving_average(&line, params.signal_period, params.signal_ma);
    let hist = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    (line, signal, hist)
}

pub fn macd(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    macd_ext(values, &MacdParams::classic(fast, slow, signal))
}

/// MACD with the fixed 12/26 legs.
pub fn macd_fix(values: &[f64], signal: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    macd(values, 12, 26, signal)
}
