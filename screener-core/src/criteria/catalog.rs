//! Built-in function catalog.
//!
//! Converts each kernel in [`crate::indicators`] into a registry entry:
//! a routine adapter, its argument sources, and a kwargs schema assembled
//! from the shared schema pieces below.

use crate::indicators::{self, math, oscillators, patterns, statistics, MaType};

use super::error::ComputeError;
use super::kwargs::{KwargField, Kwargs, KwargsSchema};
use super::registry::{FunctionRegistry, Registration, SeriesEvaluator};
use super::sources::ArgumentSource;

const OPEN: ArgumentSource = ArgumentSource::OPEN;
const HIGH: ArgumentSource = ArgumentSource::HIGH;
const LOW: ArgumentSource = ArgumentSource::LOW;
const CLOSE: ArgumentSource = ArgumentSource::CLOSE;
const VOLUME: ArgumentSource = ArgumentSource::VOLUME;
const INDEX_CLOSE: ArgumentSource = ArgumentSource::INDEX_CLOSE;

const OVERLAP: &str = "Overlap Studies";
const MOMENTUM: &str = "Momentum Indicators";
const VOLUME_GROUP: &str = "Volume Indicators";
const VOLATILITY: &str = "Volatility Indicators";
const MATH: &str = "Math Operators";
const STATISTICS: &str = "Statistic Functions";
const PATTERNS: &str = "Pattern Recognition";
const PRICE: &str = "Price";

// ─── Shared schemas ──────────────────────────────────────────────────

fn time_period() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::int("timeperiod", 14).describe("Number of bars in the lookback window")
    ])
}

fn penetration(default: f64) -> KwargsSchema {
    KwargsSchema::new(vec![KwargField::float("penetration", default)
        .describe("Fraction of the first body the pattern must penetrate")])
}

fn fast_slow_period() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::int("fastperiod", 12).describe("Fast moving average period"),
        KwargField::int("slowperiod", 26).describe("Slow moving average period"),
    ])
}

fn ma_type() -> KwargsSchema {
    KwargsSchema::new(vec![KwargField::int("matype", 0).describe(
        "Moving average type: 0=SMA 1=EMA 2=WMA 3=DEMA 4=TEMA 5=TRIMA 6=KAMA 8=T3",
    )])
}

fn signal_period() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::int("signalperiod", 9).describe("Signal line period")
    ])
}

fn nb_dev() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::float("nbdev", 1.0).describe("Number of deviations")
    ])
}

fn nb_dev_up_down() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::float("nbdevup", 2.0).describe("Deviations above the middle band"),
        KwargField::float("nbdevdn", 2.0).describe("Deviations below the middle band"),
    ])
}

fn acceleration() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::float("acceleration", 0.02).describe("Acceleration factor step"),
        KwargField::float("maximum", 0.2).describe("Acceleration factor ceiling"),
    ])
}

fn sarext_schema() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::float("startvalue", 0.0)
            .describe("Starting SAR; positive starts long, negative short, 0 detects"),
        KwargField::float("offsetonreverse", 0.0).describe("Fraction added to the SAR on reversal"),
        KwargField::float("accelerationinitlong", 0.02),
        KwargField::float("accelerationlong", 0.02),
        KwargField::float("accelerationmaxlong", 0.2),
        KwargField::float("accelerationinitshort", 0.02),
        KwargField::float("accelerationshort", 0.02),
        KwargField::float("accelerationmaxshort", 0.2),
    ])
}

fn mama_schema() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::float("fastlimit", 0.5).describe("Upper limit of the smoothing factor"),
        KwargField::float("slowlimit", 0.05).describe("Lower limit of the smoothing factor"),
    ])
}

fn v_factor() -> KwargsSchema {
    KwargsSchema::new(vec![KwargField::float("vfactor", 0.7).describe("Volume factor")])
}

fn stoch_schema() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::int("fastk_period", 5),
        KwargField::int("slowk_period", 3),
        KwargField::int("slowk_matype", 0),
        KwargField::int("slowd_period", 3),
        KwargField::int("slowd_matype", 0),
    ])
}

fn stochf_schema() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::int("fastk_period", 5),
        KwargField::int("fastd_period", 3),
        KwargField::int("fastd_matype", 0),
    ])
}

fn ultosc_schema() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::int("timeperiod1", 7),
        KwargField::int("timeperiod2", 14),
        KwargField::int("timeperiod3", 28),
    ])
}

fn macdext_schema() -> KwargsSchema {
    KwargsSchema::new(vec![
        KwargField::int("fastperiod", 12),
        KwargField::int("fastmatype", 0),
        KwargField::int("slowperiod", 26),
        KwargField::int("slowmatype", 0),
        KwargField::int("signalperiod", 9),
        KwargField::int("signalmatype", 0),
    ])
}

fn merged(parts: &[KwargsSchema]) -> KwargsSchema {
    KwargsSchema::merge_all(parts)
}

// ─── Kwarg access ────────────────────────────────────────────────────

/// Integer period `key`, at least `min`.
fn period(kwargs: &Kwargs, key: &str, min: usize) -> Result<usize, ComputeError> {
    let value = kwargs
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ComputeError::MissingArgument(key.to_string()))?;
    if value < min as i64 {
        return Err(ComputeError::OutOfRange {
            name: key.to_string(),
            min: min as i64,
            value,
        });
    }
    Ok(value as usize)
}

fn float(kwargs: &Kwargs, key: &str) -> Result<f64, ComputeError> {
    kwargs
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| ComputeError::MissingArgument(key.to_string()))
}

fn ma(kwargs: &Kwargs, key: &str) -> Result<MaType, ComputeError> {
    let code = kwargs
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ComputeError::MissingArgument(key.to_string()))?;
    MaType::from_code(code).ok_or_else(|| ComputeError::UnknownMaType {
        key: key.to_string(),
        code,
    })
}

/// Borrow exactly `N` input series.
fn inputs<const N: usize>(series: &[Vec<f64>]) -> Result<[&[f64]; N], ComputeError> {
    if series.len() != N {
        return Err(ComputeError::Arity {
            expected: N,
            actual: series.len(),
        });
    }
    Ok(std::array::from_fn(|i| series[i].as_slice()))
}

// ─── Routine adapters ────────────────────────────────────────────────

type Output = Result<Vec<f64>, ComputeError>;

fn passthrough() -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    |series: &[Vec<f64>], _: &Kwargs| {
        let [x] = inputs::<1>(series)?;
        Ok(x.to_vec())
    }
}

fn unary(
    kernel: fn(&[f64]) -> Vec<f64>,
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], _: &Kwargs| {
        let [x] = inputs::<1>(series)?;
        Ok(kernel(x))
    }
}

fn with_period(
    kernel: fn(&[f64], usize) -> Vec<f64>,
    min: usize,
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [x] = inputs::<1>(series)?;
        Ok(kernel(x, period(kwargs, "timeperiod", min)?))
    }
}

fn pair_with_period(
    kernel: fn(&[f64], &[f64], usize) -> Vec<f64>,
    min: usize,
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [a, b] = inputs::<2>(series)?;
        Ok(kernel(a, b, period(kwargs, "timeperiod", min)?))
    }
}

fn hlc_with_period(
    kernel: fn(&[f64], &[f64], &[f64], usize) -> Vec<f64>,
    min: usize,
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [h, l, c] = inputs::<3>(series)?;
        Ok(kernel(h, l, c, period(kwargs, "timeperiod", min)?))
    }
}

fn pair(
    kernel: fn(&[f64], &[f64]) -> Vec<f64>,
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], _: &Kwargs| {
        let [a, b] = inputs::<2>(series)?;
        Ok(kernel(a, b))
    }
}

fn candle(
    kernel: fn(&[f64], &[f64], &[f64], &[f64]) -> Vec<f64>,
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], _: &Kwargs| {
        let [o, h, l, c] = inputs::<4>(series)?;
        Ok(kernel(o, h, l, c))
    }
}

fn candle_with_penetration(
    kernel: fn(&[f64], &[f64], &[f64], &[f64], f64) -> Vec<f64>,
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [o, h, l, c] = inputs::<4>(series)?;
        Ok(kernel(o, h, l, c, float(kwargs, "penetration")?))
    }
}

// ─── Routines with bespoke kwargs ────────────────────────────────────

fn ma_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [x] = inputs::<1>(series)?;
    Ok(indicators::moving_average(
        x,
        period(kwargs, "timeperiod", 2)?,
        ma(kwargs, "matype")?,
    ))
}

fn t3_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [x] = inputs::<1>(series)?;
    Ok(indicators::t3(
        x,
        period(kwargs, "timeperiod", 2)?,
        float(kwargs, "vfactor")?,
    ))
}

#[derive(Clone, Copy)]
enum Band {
    Upper,
    Middle,
    Lower,
}

fn bbands_routine(band: Band) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [x] = inputs::<1>(series)?;
        let (upper, middle, lower) = indicators::bbands(
            x,
            period(kwargs, "timeperiod", 2)?,
            float(kwargs, "nbdevup")?,
            float(kwargs, "nbdevdn")?,
            ma(kwargs, "matype")?,
        );
        Ok(match band {
            Band::Upper => upper,
            Band::Middle => middle,
            Band::Lower => lower,
        })
    }
}

fn stddev_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [x] = inputs::<1>(series)?;
    Ok(indicators::stddev(
        x,
        period(kwargs, "timeperiod", 2)?,
        float(kwargs, "nbdev")?,
    ))
}

fn sar_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [h, l] = inputs::<2>(series)?;
    Ok(indicators::sar(
        h,
        l,
        float(kwargs, "acceleration")?,
        float(kwargs, "maximum")?,
    ))
}

fn sarext_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [h, l] = inputs::<2>(series)?;
    let params = indicators::SarExtParams {
        start_value: float(kwargs, "startvalue")?,
        offset_on_reverse: float(kwargs, "offsetonreverse")?,
        af_init_long: float(kwargs, "accelerationinitlong")?,
        af_long: float(kwargs, "accelerationlong")?,
        af_max_long: float(kwargs, "accelerationmaxlong")?,
        af_init_short: float(kwargs, "accelerationinitshort")?,
        af_short: float(kwargs, "accelerationshort")?,
        af_max_short: float(kwargs, "accelerationmaxshort")?,
    };
    Ok(indicators::sar_ext(h, l, &params))
}

fn mama_routine(fama: bool) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [x] = inputs::<1>(series)?;
        let (mama, following) =
            indicators::mama(x, float(kwargs, "fastlimit")?, float(kwargs, "slowlimit")?);
        Ok(if fama { following } else { mama })
    }
}

fn aroon_routine(up: bool) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [h, l] = inputs::<2>(series)?;
        let (down, aroon_up) = indicators::aroon(h, l, period(kwargs, "timeperiod", 2)?);
        Ok(if up { aroon_up } else { down })
    }
}

fn spread_routine(
    kernel: fn(&[f64], usize, usize, MaType) -> Vec<f64>,
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [x] = inputs::<1>(series)?;
        Ok(kernel(
            x,
            period(kwargs, "fastperiod", 2)?,
            period(kwargs, "slowperiod", 2)?,
            ma(kwargs, "matype")?,
        ))
    }
}

#[derive(Clone, Copy)]
enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

fn pick_macd(line: MacdLine, outputs: (Vec<f64>, Vec<f64>, Vec<f64>)) -> Vec<f64> {
    match line {
        MacdLine::Macd => outputs.0,
        MacdLine::Signal => outputs.1,
        MacdLine::Histogram => outputs.2,
    }
}

fn macd_routine(line: MacdLine) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [x] = inputs::<1>(series)?;
        let outputs = oscillators::macd(
            x,
            period(kwargs, "fastperiod", 2)?,
            period(kwargs, "slowperiod", 2)?,
            period(kwargs, "signalperiod", 1)?,
        );
        Ok(pick_macd(line, outputs))
    }
}

fn macdext_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [x] = inputs::<1>(series)?;
    let params = oscillators::MacdParams {
        fast_period: period(kwargs, "fastperiod", 2)?,
        fast_ma: ma(kwargs, "fastmatype")?,
        slow_period: period(kwargs, "slowperiod", 2)?,
        slow_ma: ma(kwargs, "slowmatype")?,
        signal_period: period(kwargs, "signalperiod", 1)?,
        signal_ma: ma(kwargs, "signalmatype")?,
    };
    Ok(oscillators::macd_ext(x, &params).0)
}

fn macdfix_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [x] = inputs::<1>(series)?;
    Ok(oscillators::macd_fix(x, period(kwargs, "signalperiod", 1)?).0)
}

fn stoch_routine(slow_d: bool) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [h, l, c] = inputs::<3>(series)?;
        let params = oscillators::StochParams {
            fastk_period: period(kwargs, "fastk_period", 1)?,
            slowk_period: period(kwargs, "slowk_period", 1)?,
            slowk_ma: ma(kwargs, "slowk_matype")?,
            slowd_period: period(kwargs, "slowd_period", 1)?,
            slowd_ma: ma(kwargs, "slowd_matype")?,
        };
        let (k, d) = oscillators::stoch(h, l, c, &params);
        Ok(if slow_d { d } else { k })
    }
}

fn stochf_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [h, l, c] = inputs::<3>(series)?;
    Ok(oscillators::stochf(
        h,
        l,
        c,
        period(kwargs, "fastk_period", 1)?,
        period(kwargs, "fastd_period", 1)?,
        ma(kwargs, "fastd_matype")?,
    )
    .0)
}

fn stochrsi_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [x] = inputs::<1>(series)?;
    Ok(oscillators::stochrsi(
        x,
        period(kwargs, "timeperiod", 2)?,
        period(kwargs, "fastk_period", 1)?,
        period(kwargs, "fastd_period", 1)?,
        ma(kwargs, "fastd_matype")?,
    )
    .0)
}

fn ultosc_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [h, l, c] = inputs::<3>(series)?;
    let periods = (
        period(kwargs, "timeperiod1", 1)?,
        period(kwargs, "timeperiod2", 1)?,
        period(kwargs, "timeperiod3", 1)?,
    );
    Ok(oscillators::ultosc(h, l, c, periods))
}

fn mfi_routine(series: &[Vec<f64>], kwargs: &Kwargs) -> Output {
    let [h, l, c, v] = inputs::<4>(series)?;
    Ok(oscillators::mfi(h, l, c, v, period(kwargs, "timeperiod", 2)?))
}

fn trange_routine(series: &[Vec<f64>], _: &Kwargs) -> Output {
    let [h, l, c] = inputs::<3>(series)?;
    Ok(indicators::true_range(h, l, c))
}

fn bop_routine(series: &[Vec<f64>], _: &Kwargs) -> Output {
    let [o, h, l, c] = inputs::<4>(series)?;
    Ok(oscillators::bop(o, h, l, c))
}

fn min_max_routine(
    kernel: fn(&[f64], usize) -> (Vec<f64>, Vec<f64>),
) -> impl Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static {
    move |series: &[Vec<f64>], kwargs: &Kwargs| {
        let [x] = inputs::<1>(series)?;
        Ok(kernel(x, period(kwargs, "timeperiod", 2)?).0)
    }
}

// ─── Registration ────────────────────────────────────────────────────

fn entry<F>(name: &str, routine: F, sources: &[ArgumentSource]) -> Registration
where
    F: Fn(&[Vec<f64>], &Kwargs) -> Output + Send + Sync + 'static,
{
    Registration::new(name, SeriesEvaluator::new(routine, sources))
}

/// Registry holding every built-in function.
pub fn builtin_registry() -> FunctionRegistry {
    let mut reg = FunctionRegistry::new();
    register_price(&mut reg);
    register_overlap(&mut reg);
    register_momentum(&mut reg);
    register_volatility(&mut reg);
    register_math(&mut reg);
    register_statistics(&mut reg);
    register_patterns(&mut reg);
    tracing::debug!(functions = reg.len(), "built-in catalog registered");
    reg
}

fn register_price(reg: &mut FunctionRegistry) {
    let columns = [
        ("OPEN", OPEN, "Open price"),
        ("HIGH", HIGH, "High price"),
        ("LOW", LOW, "Low price"),
        ("CLOSE", CLOSE, "Close price"),
        ("VOLUME", VOLUME, "Traded volume"),
        ("INDEX_CLOSE", INDEX_CLOSE, "Close of the market index"),
    ];
    for (name, source, description) in columns {
        reg.register(
            entry(name, passthrough(), &[source])
                .describe(description)
                .group(PRICE),
        );
    }
}

fn register_overlap(reg: &mut FunctionRegistry) {
    let averages: [(&str, fn(&[f64], usize) -> Vec<f64>, &str); 7] = [
        ("SMA", indicators::sma, "Simple Moving Average"),
        ("EMA", indicators::ema, "Exponential Moving Average"),
        ("WMA", indicators::wma, "Weighted Moving Average"),
        ("DEMA", indicators::dema, "Double Exponential Moving Average"),
        ("TEMA", indicators::tema, "Triple Exponential Moving Average"),
        ("TRIMA", indicators::trima, "Triangular Moving Average"),
        ("KAMA", indicators::kama, "Kaufman Adaptive Moving Average"),
    ];
    for (name, kernel, description) in averages {
        reg.register(
            entry(name, with_period(kernel, 2), &[CLOSE])
                .schema(time_period())
                .describe(description)
                .group(OVERLAP),
        );
    }

    reg.register(
        entry("T3", t3_routine, &[CLOSE])
            .schema(merged(&[time_period(), v_factor()]))
            .describe("Triple Exponential Moving Average (T3)")
            .group(OVERLAP),
    );
    reg.register(
        entry("MA", ma_routine, &[CLOSE])
            .schema(merged(&[time_period(), ma_type()]))
            .describe("Moving average")
            .group(OVERLAP),
    );

    let bands_schema = merged(&[time_period(), nb_dev_up_down(), ma_type()]);
    let bands = [
        ("BBANDS", Band::Upper, "Bollinger Bands (upper band)"),
        ("BBANDS_MIDDLE", Band::Middle, "Bollinger Bands (middle band)"),
        ("BBANDS_LOWER", Band::Lower, "Bollinger Bands (lower band)"),
    ];
    for (name, band, description) in bands {
        reg.register(
            entry(name, bbands_routine(band), &[CLOSE])
                .schema(bands_schema.clone())
                .describe(description)
                .group(OVERLAP),
        );
    }

    reg.register(
        entry("MIDPOINT", with_period(math::midpoint, 2), &[CLOSE])
            .schema(time_period())
            .describe("MidPoint over period")
            .group(OVERLAP),
    );
    reg.register(
        entry("MIDPRICE", pair_with_period(math::midprice, 2), &[HIGH, LOW])
            .schema(time_period())
            .describe("Midpoint Price over period")
            .group(OVERLAP),
    );
    reg.register(
        entry("SAR", sar_routine, &[HIGH, LOW])
            .schema(acceleration())
            .describe("Parabolic SAR")
            .group(OVERLAP),
    );
    reg.register(
        entry("SAREXT", sarext_routine, &[HIGH, LOW])
            .schema(sarext_schema())
            .describe("Parabolic SAR - Extended")
            .group(OVERLAP),
    );
    reg.register(
        entry("MAMA", mama_routine(false), &[CLOSE])
            .schema(mama_schema())
            .describe("MESA Adaptive Moving Average (mama)")
            .group(OVERLAP),
    );
    reg.register(
        entry("MAMA_FAMA", mama_routine(true), &[CLOSE])
            .schema(mama_schema())
            .describe("MESA Adaptive Moving Average (fama)")
            .group(OVERLAP),
    );
    reg.register(
        entry("HT_TRENDLINE", unary(indicators::ht_trendline), &[CLOSE])
            .describe("Hilbert Transform - Instantaneous Trendline")
            .group(OVERLAP),
    );
}

fn register_momentum(reg: &mut FunctionRegistry) {
    let hlc: [(&str, fn(&[f64], &[f64], &[f64], usize) -> Vec<f64>, &str); 7] = [
        ("ADX", indicators::adx, "Average Directional Movement Index"),
        ("ADXR", indicators::adxr, "Average Directional Movement Index Rating"),
        ("DX", indicators::dx, "Directional Movement Index"),
        ("PLUS_DI", indicators::plus_di, "Plus Directional Indicator"),
        ("MINUS_DI", indicators::minus_di, "Minus Directional Indicator"),
        ("WILLR", oscillators::willr, "Williams' %R"),
        ("CCI", oscillators::cci, "Commodity Channel Index"),
    ];
    for (name, kernel, description) in hlc {
        reg.register(
            entry(name, hlc_with_period(kernel, 2), &[HIGH, LOW, CLOSE])
                .schema(time_period())
                .describe(description)
                .group(MOMENTUM),
        );
    }

    let hl: [(&str, fn(&[f64], &[f64], usize) -> Vec<f64>, &str); 3] = [
        ("PLUS_DM", indicators::plus_dm, "Plus Directional Movement"),
        ("MINUS_DM", indicators::minus_dm, "Minus Directional Movement"),
        ("AROONOSC", indicators::aroon_osc, "Aroon Oscillator"),
    ];
    for (name, kernel, description) in hl {
        reg.register(
            entry(name, pair_with_period(kernel, 2), &[HIGH, LOW])
                .schema(time_period())
                .describe(description)
                .group(MOMENTUM),
        );
    }
    reg.register(
        entry("AROON", aroon_routine(false), &[HIGH, LOW])
            .schema(time_period())
            .describe("Aroon (aroondown)")
            .group(MOMENTUM),
    );
    reg.register(
        entry("AROON_UP", aroon_routine(true), &[HIGH, LOW])
            .schema(time_period())
            .describe("Aroon (aroonup)")
            .group(MOMENTUM),
    );

    let single: [(&str, fn(&[f64], usize) -> Vec<f64>, usize, &str); 8] = [
        ("RSI", indicators::rsi, 2, "Relative Strength Index"),
        ("CMO", indicators::cmo, 2, "Chande Momentum Oscillator"),
        ("MOM", indicators::mom, 1, "Momentum"),
        ("ROC", indicators::roc, 1, "Rate of change: ((price/prevPrice)-1)*100"),
        ("ROCP", indicators::rocp, 1, "Rate of change Percentage: (price-prevPrice)/prevPrice"),
        ("ROCR", indicators::rocr, 1, "Rate of change ratio: (price/prevPrice)"),
        ("ROCR100", indicators::rocr100, 1, "Rate of change ratio 100 scale: (price/prevPrice)*100"),
        ("TRIX", oscillators::trix, 1, "1-day Rate-Of-Change of a Triple Smooth EMA"),
    ];
    for (name, kernel, min, description) in single {
        reg.register(
            entry(name, with_period(kernel, min), &[CLOSE])
                .schema(time_period())
                .describe(description)
                .group(MOMENTUM),
        );
    }

    let spread_schema = merged(&[fast_slow_period(), ma_type()]);
    reg.register(
        entry("APO", spread_routine(oscillators::apo), &[CLOSE])
            .schema(spread_schema.clone())
            .describe("Absolute Price Oscillator")
            .group(MOMENTUM),
    );
    reg.register(
        entry("PPO", spread_routine(oscillators::ppo), &[CLOSE])
            .schema(spread_schema)
            .describe("Percentage Price Oscillator")
            .group(MOMENTUM),
    );

    let macd_schema = merged(&[fast_slow_period(), signal_period()]);
    let macd_lines = [
        ("MACD", MacdLine::Macd, "Moving Average Convergence/Divergence"),
        ("MACD_SIGNAL", MacdLine::Signal, "MACD signal line"),
        ("MACD_HIST", MacdLine::Histogram, "MACD histogram"),
    ];
    for (name, line, description) in macd_lines {
        reg.register(
            entry(name, macd_routine(line), &[CLOSE])
                .schema(macd_schema.clone())
                .describe(description)
                .group(MOMENTUM),
        );
    }
    reg.register(
        entry("MACDEXT", macdext_routine, &[CLOSE])
            .schema(macdext_schema())
            .describe("MACD with controllable MA type")
            .group(MOMENTUM),
    );
    reg.register(
        entry("MACDFIX", macdfix_routine, &[CLOSE])
            .schema(signal_period())
            .describe("Moving Average Convergence/Divergence Fix 12/26")
            .group(MOMENTUM),
    );

    reg.register(
        entry("STOCH", stoch_routine(false), &[HIGH, LOW, CLOSE])
            .schema(stoch_schema())
            .describe("Stochastic (slowk)")
            .group(MOMENTUM),
    );
    reg.register(
        entry("STOCH_D", stoch_routine(true), &[HIGH, LOW, CLOSE])
            .schema(stoch_schema())
            .describe("Stochastic (slowd)")
            .group(MOMENTUM),
    );
    reg.register(
        entry("STOCHF", stochf_routine, &[HIGH, LOW, CLOSE])
            .schema(stochf_schema())
            .describe("Stochastic Fast (fastk)")
            .group(MOMENTUM),
    );
    reg.register(
        entry("STOCHRSI", stochrsi_routine, &[CLOSE])
            .schema(merged(&[time_period(), stochf_schema()]))
            .describe("Stochastic Relative Strength Index (fastk)")
            .group(MOMENTUM),
    );
    reg.register(
        entry("ULTOSC", ultosc_routine, &[HIGH, LOW, CLOSE])
            .schema(ultosc_schema())
            .describe("Ultimate Oscillator")
            .group(MOMENTUM),
    );
    reg.register(
        entry("BOP", bop_routine, &[OPEN, HIGH, LOW, CLOSE])
            .describe("Balance Of Power")
            .group(MOMENTUM),
    );
    reg.register(
        entry("MFI", mfi_routine, &[HIGH, LOW, CLOSE, VOLUME])
            .schema(time_period())
            .describe("Money Flow Index")
            .group(VOLUME_GROUP),
    );
}

fn register_volatility(reg: &mut FunctionRegistry) {
    reg.register(
        entry("ATR", hlc_with_period(indicators::atr, 1), &[HIGH, LOW, CLOSE])
            .schema(time_period())
            .describe("Average True Range")
            .group(VOLATILITY),
    );
    reg.register(
        entry("NATR", hlc_with_period(indicators::natr, 1), &[HIGH, LOW, CLOSE])
            .schema(time_period())
            .describe("Normalized Average True Range")
            .group(VOLATILITY),
    );
    reg.register(
        entry("TRANGE", trange_routine, &[HIGH, LOW, CLOSE])
            .describe("True Range")
            .group(VOLATILITY),
    );
}

fn register_math(reg: &mut FunctionRegistry) {
    // Binary operators take the market index first, then the stock.
    let binary: [(&str, fn(&[f64], &[f64]) -> Vec<f64>, &str); 4] = [
        ("ADD", math::add, "Vector Arithmetic Add"),
        ("SUB", math::sub, "Vector Arithmetic Subtraction"),
        ("MULT", math::mult, "Vector Arithmetic Mult"),
        ("DIV", math::div, "Vector Arithmetic Div"),
    ];
    for (name, kernel, description) in binary {
        reg.register(
            entry(name, pair(kernel), &[INDEX_CLOSE, CLOSE])
                .describe(description)
                .group(MATH),
        );
    }

    let rolling: [(&str, fn(&[f64], usize) -> Vec<f64>, &str); 5] = [
        ("MAX", math::rolling_max, "Highest value over a specified period"),
        ("MAXINDEX", math::max_index, "Index of highest value over a specified period"),
        ("MIN", math::rolling_min, "Lowest value over a specified period"),
        ("MININDEX", math::min_index, "Index of lowest value over a specified period"),
        ("SUM", math::rolling_sum, "Summation"),
    ];
    for (name, kernel, description) in rolling {
        reg.register(
            entry(name, with_period(kernel, 2), &[CLOSE])
                .schema(time_period())
                .describe(description)
                .group(MATH),
        );
    }
    reg.register(
        entry("MINMAX", min_max_routine(math::min_max), &[CLOSE])
            .schema(time_period())
            .describe("Lowest and highest values over a specified period (min)")
            .group(MATH),
    );
    reg.register(
        entry("MINMAXINDEX", min_max_routine(math::min_max_index), &[CLOSE])
            .schema(time_period())
            .describe("Indexes of lowest and highest values over a specified period (minidx)")
            .group(MATH),
    );
}

fn register_statistics(reg: &mut FunctionRegistry) {
    reg.register(
        entry("STDDEV", stddev_routine, &[CLOSE])
            .schema(merged(&[time_period(), nb_dev()]))
            .describe("Standard Deviation")
            .group(STATISTICS),
    );
    reg.register(
        entry("VAR", with_period(indicators::variance, 1), &[CLOSE])
            .schema(time_period())
            .describe("Variance")
            .group(STATISTICS),
    );
    reg.register(
        entry("BETA", pair_with_period(statistics::beta, 2), &[INDEX_CLOSE, CLOSE])
            .schema(time_period())
            .describe("Beta")
            .group(STATISTICS),
    );
    reg.register(
        entry("CORREL", pair_with_period(statistics::correl, 2), &[INDEX_CLOSE, CLOSE])
            .schema(time_period())
            .describe("Pearson's Correlation Coefficient (r)")
            .group(STATISTICS),
    );

    let regressions: [(&str, fn(&[f64], usize) -> Vec<f64>, &str); 5] = [
        ("LINEARREG", statistics::linearreg, "Linear Regression"),
        ("LINEARREG_SLOPE", statistics::linearreg_slope, "Linear Regression Slope"),
        ("LINEARREG_INTERCEPT", statistics::linearreg_intercept, "Linear Regression Intercept"),
        ("LINEARREG_ANGLE", statistics::linearreg_angle, "Linear Regression Angle"),
        ("TSF", statistics::tsf, "Time Series Forecast"),
    ];
    for (name, kernel, description) in regressions {
        reg.register(
            entry(name, with_period(kernel, 2), &[CLOSE])
                .schema(time_period())
                .describe(description)
                .group(STATISTICS),
        );
    }
}

type CandleKernel = fn(&[f64], &[f64], &[f64], &[f64]) -> Vec<f64>;
type PenetrationKernel = fn(&[f64], &[f64], &[f64], &[f64], f64) -> Vec<f64>;

fn register_patterns(reg: &mut FunctionRegistry) {
    let simple: [(&str, CandleKernel, &str); 54] = [
        ("CDL2CROWS", patterns::cdl_2_crows, "Two Crows"),
        ("CDL3BLACKCROWS", patterns::cdl_3_black_crows, "Three Black Crows"),
        ("CDL3INSIDE", patterns::cdl_3_inside, "Three Inside Up/Down"),
        ("CDL3LINESTRIKE", patterns::cdl_3_line_strike, "Three-Line Strike"),
        ("CDL3OUTSIDE", patterns::cdl_3_outside, "Three Outside Up/Down"),
        ("CDL3STARSINSOUTH", patterns::cdl_3_stars_in_south, "Three Stars In The South"),
        ("CDL3WHITESOLDIERS", patterns::cdl_3_white_soldiers, "Three Advancing White Soldiers"),
        ("CDLADVANCEBLOCK", patterns::cdl_advance_block, "Advance Block"),
        ("CDLBELTHOLD", patterns::cdl_belt_hold, "Belt-hold"),
        ("CDLBREAKAWAY", patterns::cdl_breakaway, "Breakaway"),
        ("CDLCLOSINGMARUBOZU", patterns::cdl_closing_marubozu, "Closing Marubozu"),
        ("CDLCONCEALBABYSWALL", patterns::cdl_conceal_baby_swallow, "Concealing Baby Swallow"),
        ("CDLCOUNTERATTACK", patterns::cdl_counterattack, "Counterattack"),
        ("CDLDOJI", patterns::cdl_doji, "Doji"),
        ("CDLDOJISTAR", patterns::cdl_doji_star, "Doji Star"),
        ("CDLDRAGONFLYDOJI", patterns::cdl_dragonfly_doji, "Dragonfly Doji"),
        ("CDLENGULFING", patterns::cdl_engulfing, "Engulfing Pattern"),
        ("CDLGAPSIDESIDEWHITE", patterns::cdl_gap_side_side_white, "Up/Down-gap side-by-side white lines"),
        ("CDLGRAVESTONEDOJI", patterns::cdl_gravestone_doji, "Gravestone Doji"),
        ("CDLHAMMER", patterns::cdl_hammer, "Hammer"),
        ("CDLHANGINGMAN", patterns::cdl_hanging_man, "Hanging Man"),
        ("CDLHARAMI", patterns::cdl_harami, "Harami Pattern"),
        ("CDLHARAMICROSS", patterns::cdl_harami_cross, "Harami Cross Pattern"),
        ("CDLHIGHWAVE", patterns::cdl_high_wave, "High-Wave Candle"),
        ("CDLHIKKAKE", patterns::cdl_hikkake, "Hikkake Pattern"),
        ("CDLHIKKAKEMOD", patterns::cdl_hikkake_mod, "Modified Hikkake Pattern"),
        ("CDLHOMINGPIGEON", patterns::cdl_homing_pigeon, "Homing Pigeon"),
        ("CDLIDENTICAL3CROWS", patterns::cdl_identical_3_crows, "Identical Three Crows"),
        ("CDLINNECK", patterns::cdl_in_neck, "In-Neck Pattern"),
        ("CDLINVERTEDHAMMER", patterns::cdl_inverted_hammer, "Inverted Hammer"),
        ("CDLKICKING", patterns::cdl_kicking, "Kicking"),
        ("CDLKICKINGBYLENGTH", patterns::cdl_kicking_by_length, "Kicking - bull/bear determined by the longer marubozu"),
        ("CDLLADDERBOTTOM", patterns::cdl_ladder_bottom, "Ladder Bottom"),
        ("CDLLONGLEGGEDDOJI", patterns::cdl_long_legged_doji, "Long Legged Doji"),
        ("CDLLONGLINE", patterns::cdl_long_line, "Long Line Candle"),
        ("CDLMARUBOZU", patterns::cdl_marubozu, "Marubozu"),
        ("CDLMATCHINGLOW", patterns::cdl_matching_low, "Matching Low"),
        ("CDLONNECK", patterns::cdl_on_neck, "On-Neck Pattern"),
        ("CDLPIERCING", patterns::cdl_piercing, "Piercing Pattern"),
        ("CDLRICKSHAWMAN", patterns::cdl_rickshaw_man, "Rickshaw Man"),
        ("CDLRISEFALL3METHODS", patterns::cdl_rise_fall_3_methods, "Rising/Falling Three Methods"),
        ("CDLSEPARATINGLINES", patterns::cdl_separating_lines, "Separating Lines"),
        ("CDLSHOOTINGSTAR", patterns::cdl_shooting_star, "Shooting Star"),
        ("CDLSHORTLINE", patterns::cdl_short_line, "Short Line Candle"),
        ("CDLSPINNINGTOP", patterns::cdl_spinning_top, "Spinning Top"),
        ("CDLSTALLEDPATTERN", patterns::cdl_stalled_pattern, "Stalled Pattern"),
        ("CDLSTICKSANDWICH", patterns::cdl_stick_sandwich, "Stick Sandwich"),
        ("CDLTAKURI", patterns::cdl_takuri, "Takuri (Dragonfly Doji with very long lower shadow)"),
        ("CDLTASUKIGAP", patterns::cdl_tasuki_gap, "Tasuki Gap"),
        ("CDLTHRUSTING", patterns::cdl_thrusting, "Thrusting Pattern"),
        ("CDLTRISTAR", patterns::cdl_tristar, "Tristar Pattern"),
        ("CDLUNIQUE3RIVER", patterns::cdl_unique_3_river, "Unique 3 River"),
        ("CDLUPSIDEGAP2CROWS", patterns::cdl_upside_gap_2_crows, "Upside Gap Two Crows"),
        ("CDLXSIDEGAP3METHODS", patterns::cdl_xside_gap_3_methods, "Upside/Downside Gap Three Methods"),
    ];
    for (name, kernel, description) in simple {
        reg.register(
            entry(name, candle(kernel), &[OPEN, HIGH, LOW, CLOSE])
                .describe(description)
                .group(PATTERNS),
        );
    }

    let penetrating: [(&str, PenetrationKernel, f64, &str); 7] = [
        ("CDLABANDONEDBABY", patterns::cdl_abandoned_baby, 0.3, "Abandoned Baby"),
        ("CDLDARKCLOUDCOVER", patterns::cdl_dark_cloud_cover, 0.5, "Dark Cloud Cover"),
        ("CDLEVENINGDOJISTAR", patterns::cdl_evening_doji_star, 0.3, "Evening Doji Star"),
        ("CDLEVENINGSTAR", patterns::cdl_evening_star, 0.3, "Evening Star"),
        ("CDLMATHOLD", patterns::cdl_mat_hold, 0.5, "Mat Hold"),
        ("CDLMORNINGDOJISTAR", patterns::cdl_morning_doji_star, 0.3, "Morning Doji Star"),
        ("CDLMORNINGSTAR", patterns::cdl_morning_star, 0.3, "Morning Star"),
    ];
    for (name, kernel, default, description) in penetrating {
        reg.register(
            entry(name, candle_with_penetration(kernel), &[OPEN, HIGH, LOW, CLOSE])
                .schema(penetration(default))
                .describe(description)
                .group(PATTERNS),
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::criteria::error::CriteriaError;
    use crate::domain::{Bar, StockSubject};

    fn subject(n: usize) -> StockSubject {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = (0..n)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1;
                Bar {
                    date: start + chrono::Duration::days(i as i64),
                    open: base - 0.5,
                    high: base + 1.5,
                    low: base - 1.5,
                    close: base,
                    volume: 1_000.0 + i as f64 * 10.0,
                }
            })
            .collect();
        let index: Vec<Bar> = (0..n)
            .map(|i| {
                let base = 4_000.0 + (i as f64 * 0.2).cos() * 50.0 + i as f64;
                Bar {
                    date: start + chrono::Duration::days(i as i64),
                    open: base,
                    high: base + 10.0,
                    low: base - 10.0,
                    close: base,
                    volume: 1e6,
                }
            })
            .collect();
        StockSubject::new("SYN", bars).with_index(std::sync::Arc::new(index))
    }

    #[test]
    fn catalog_names_present() {
        let reg = builtin_registry();
        for name in [
            "SMA", "EMA", "WMA", "DEMA", "TEMA", "TRIMA", "KAMA", "T3", "MA", "BBANDS",
            "BBANDS_MIDDLE", "BBANDS_LOWER", "MIDPOINT", "MIDPRICE", "SAR", "ADX", "ADXR", "DX",
            "PLUS_DI", "MINUS_DI", "PLUS_DM", "MINUS_DM", "AROON", "AROON_UP", "AROONOSC", "RSI",
            "CMO", "MOM", "ROC", "ROCP", "ROCR", "ROCR100", "WILLR", "CCI", "MFI", "BOP", "ULTOSC",
            "STOCH", "STOCH_D", "STOCHF", "STOCHRSI", "TRIX", "APO", "PPO", "MACD", "MACD_SIGNAL",
            "MACD_HIST", "MACDEXT", "MACDFIX", "ATR", "NATR", "TRANGE", "ADD", "SUB", "MULT",
            "DIV", "MAX", "MAXINDEX", "MIN", "MININDEX", "MINMAX", "MINMAXINDEX", "SUM", "STDDEV",
            "VAR", "BETA", "CORREL", "LINEARREG", "LINEARREG_SLOPE", "LINEARREG_INTERCEPT",
            "LINEARREG_ANGLE", "TSF", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME", "INDEX_CLOSE",
            "SAREXT", "MAMA", "MAMA_FAMA", "HT_TRENDLINE", "CDL2CROWS", "CDL3BLACKCROWS",
            "CDL3INSIDE", "CDL3LINESTRIKE", "CDL3OUTSIDE", "CDL3STARSINSOUTH", "CDL3WHITESOLDIERS",
            "CDLABANDONEDBABY", "CDLADVANCEBLOCK", "CDLBELTHOLD", "CDLBREAKAWAY",
            "CDLCLOSINGMARUBOZU", "CDLCONCEALBABYSWALL", "CDLCOUNTERATTACK", "CDLDARKCLOUDCOVER",
            "CDLDOJI", "CDLDOJISTAR", "CDLDRAGONFLYDOJI", "CDLENGULFING", "CDLEVENINGDOJISTAR",
            "CDLEVENINGSTAR", "CDLGAPSIDESIDEWHITE", "CDLGRAVESTONEDOJI", "CDLHAMMER",
            "CDLHANGINGMAN", "CDLHARAMI", "CDLHARAMICROSS", "CDLHIGHWAVE", "CDLHIKKAKE",
            "CDLHIKKAKEMOD", "CDLHOMINGPIGEON", "CDLIDENTICAL3CROWS", "CDLINNECK",
            "CDLINVERTEDHAMMER", "CDLKICKING", "CDLKICKINGBYLENGTH", "CDLLADDERBOTTOM",
            "CDLLONGLEGGEDDOJI", "CDLLONGLINE", "CDLMARUBOZU", "CDLMATCHINGLOW", "CDLMATHOLD",
            "CDLMORNINGDOJISTAR", "CDLMORNINGSTAR", "CDLONNECK", "CDLPIERCING", "CDLRICKSHAWMAN",
            "CDLRISEFALL3METHODS", "CDLSEPARATINGLINES", "CDLSHOOTINGSTAR", "CDLSHORTLINE",
            "CDLSPINNINGTOP", "CDLSTALLEDPATTERN", "CDLSTICKSANDWICH", "CDLTAKURI", "CDLTASUKIGAP",
            "CDLTHRUSTING", "CDLTRISTAR", "CDLUNIQUE3RIVER", "CDLUPSIDEGAP2CROWS",
            "CDLXSIDEGAP3METHODS",
        ] {
            assert!(reg.contains(name), "{name} missing from catalog");
        }
    }

    #[test]
    fn every_function_evaluates_with_defaults() {
        let reg = builtin_registry();
        let s = subject(200);
        for name in reg.names() {
            let spec = reg.make_spec(name, Kwargs::new()).unwrap();
            match reg.evaluate(&s, &spec) {
                Ok(v) => assert!(v.is_finite(), "{name} returned {v}"),
                Err(e) => panic!("{name} failed: {e}"),
            }
        }
    }

    #[test]
    fn rsi_spec_normalizes() {
        let reg = builtin_registry();
        let spec = reg
            .make_spec("RSI", Kwargs::new().with("timeperiod", 14))
            .unwrap();
        assert_eq!(spec.kwargs(), &Kwargs::new().with("timeperiod", 14));

        let err = reg
            .make_spec("RSI", Kwargs::new().with("timeperiod", 14).with("foo", 1))
            .unwrap_err();
        assert!(matches!(err, CriteriaError::FunctionValidation { .. }));
    }

    #[test]
    fn close_passthrough_is_last_close() {
        let reg = builtin_registry();
        let s = subject(10);
        let spec = reg.make_spec("CLOSE", Kwargs::new()).unwrap();
        let expected = 100.0 + (9.0_f64 * 0.3).sin() * 5.0 + 0.9;
        assert!((reg.evaluate(&s, &spec).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn period_below_minimum_is_computation_error() {
        let reg = builtin_registry();
        let spec = reg
            .make_spec("SMA", Kwargs::new().with("timeperiod", 1))
            .unwrap();
        let err = reg.evaluate(&subject(30), &spec).unwrap_err();
        assert!(matches!(
            err,
            CriteriaError::Computation {
                source: ComputeError::OutOfRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn unsupported_ma_type() {
        let reg = builtin_registry();
        let spec = reg
            .make_spec("MA", Kwargs::new().with("matype", 7))
            .unwrap();
        let err = reg.evaluate(&subject(30), &spec).unwrap_err();
        assert_eq!(
            err,
            CriteriaError::validation("MA", "matype", "unsupported moving average type 7")
        );
    }

    #[test]
    fn short_history_is_degenerate() {
        let reg = builtin_registry();
        let spec = reg.make_spec("SMA", Kwargs::new()).unwrap();
        let err = reg.evaluate(&subject(5), &spec).unwrap_err();
        assert!(matches!(err, CriteriaError::DegenerateResult { .. }));
    }

    #[test]
    fn huge_period_is_degenerate_not_a_panic() {
        let reg = builtin_registry();
        let s = subject(60);
        for name in ["SMA", "WMA", "TRIMA", "EMA", "RSI", "MAX", "LINEARREG"] {
            let spec = reg
                .make_spec(name, Kwargs::new().with("timeperiod", 5_000_000_000_i64))
                .unwrap();
            let err = reg.evaluate(&s, &spec).unwrap_err();
            assert!(
                matches!(err, CriteriaError::DegenerateResult { .. }),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn sarext_defaults_track_sar() {
        let reg = builtin_registry();
        let s = subject(120);
        let value = |name: &str| {
            let spec = reg.make_spec(name, Kwargs::new()).unwrap();
            reg.evaluate(&s, &spec).unwrap()
        };
        assert!((value("SAREXT").abs() - value("SAR")).abs() < 1e-9);
    }

    #[test]
    fn penetration_defaults_per_pattern() {
        let reg = builtin_registry();
        for (name, expected) in [
            ("CDLABANDONEDBABY", 0.3),
            ("CDLDARKCLOUDCOVER", 0.5),
            ("CDLMATHOLD", 0.5),
            ("CDLMORNINGDOJISTAR", 0.3),
        ] {
            let schema = reg.get(name).unwrap().kwargs_schema.clone().unwrap();
            let field = schema.field("penetration").unwrap();
            assert_eq!(field.default.as_ref().and_then(|v| v.as_f64()), Some(expected), "{name}");
        }
        assert!(reg.get("CDLDOJI").unwrap().kwargs_schema.is_none());
    }

    #[test]
    fn pattern_groups_cover_every_candlestick() {
        let reg = builtin_registry();
        let candles: Vec<&str> = reg.names().into_iter().filter(|n| n.starts_with("CDL")).collect();
        assert_eq!(candles.len(), 61);
        for name in candles {
            let group = reg.get(name).unwrap().group.clone();
            assert_eq!(group.as_deref(), Some(PATTERNS), "{name}");
        }
    }

    #[test]
    fn bbands_outputs_ordered() {
        let reg = builtin_registry();
        let s = subject(60);
        let value = |name: &str| {
            let spec = reg.make_spec(name, Kwargs::new()).unwrap();
            reg.evaluate(&s, &spec).unwrap()
        };
        assert!(value("BBANDS") > value("BBANDS_MIDDLE"));
        assert!(value("BBANDS_MIDDLE") > value("BBANDS_LOWER"));
    }
}
