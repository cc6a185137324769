//! Percentage returns over fixed calendar windows.
//!
//! Windows are anchored on the subject's last bar date. The price for a date
//! is the close of the latest bar on or before it, so weekends and holidays
//! fall back to the previous session.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use screener_core::domain::Subject;

/// Lookback window for a reported return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnWindow {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "3D")]
    ThreeDays,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "YTD")]
    YearToDate,
}

impl ReturnWindow {
    pub const DEFAULTS: [ReturnWindow; 5] = [
        ReturnWindow::OneDay,
        ReturnWindow::ThreeDays,
        ReturnWindow::OneWeek,
        ReturnWindow::OneMonth,
        ReturnWindow::YearToDate,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ReturnWindow::OneDay => "1D",
            ReturnWindow::ThreeDays => "3D",
            ReturnWindow::OneWeek => "1W",
            ReturnWindow::OneMonth => "1M",
            ReturnWindow::YearToDate => "YTD",
        }
    }

    /// First date of the window ending at `anchor`.
    pub fn start_date(&self, anchor: NaiveDate) -> NaiveDate {
        let days_back = match self {
            ReturnWindow::OneDay => 1,
            ReturnWindow::ThreeDays => 3,
            ReturnWindow::OneWeek => 7,
            ReturnWindow::OneMonth => 30,
            ReturnWindow::YearToDate => {
                return NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap_or(anchor);
            }
        };
        anchor - Duration::days(days_back)
    }
}

impl fmt::Display for ReturnWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown return window: {0}")]
pub struct UnknownWindow(pub String);

impl FromStr for ReturnWindow {
    type Err = UnknownWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        ReturnWindow::DEFAULTS
            .into_iter()
            .find(|w| w.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| UnknownWindow(s.to_string()))
    }
}

/// One reported return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowReturn {
    pub window: ReturnWindow,
    pub percent: f64,
}

/// `(end - start) / start * 100`, rounded half away from zero to 2 decimals.
///
/// Prices enter as their shortest decimal form, so a decimal tie such as
/// 1.005 rounds up. Missing prices and a zero start price report 0.
pub fn percentage_change(start: Option<f64>, end: Option<f64>) -> f64 {
    match (start, end) {
        (Some(start), Some(end)) if start != 0.0 && start.is_finite() && end.is_finite() => {
            decimal_change(start, end).unwrap_or_else(|| round2((end - start) / start * 100.0))
        }
        _ => 0.0,
    }
}

fn decimal(value: f64) -> Option<Decimal> {
    value.to_string().parse().ok()
}

/// `None` when a price or the result falls outside `Decimal`'s range.
fn decimal_change(start: f64, end: f64) -> Option<f64> {
    let (start, end) = (decimal(start)?, decimal(end)?);
    end.checked_sub(start)?
        .checked_div(start)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

/// Binary fallback for values `Decimal` cannot hold.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Return of `subject` over `window`, anchored on its last bar.
pub fn window_return(subject: &dyn Subject, window: ReturnWindow) -> f64 {
    let Some(anchor) = subject.last_date() else {
        return 0.0;
    };
    let start = subject.price_on(window.start_date(anchor));
    percentage_change(start, subject.price_on(anchor))
}

/// Returns for every window, in the order given.
pub fn window_returns(subject: &dyn Subject, windows: &[ReturnWindow]) -> Vec<WindowReturn> {
    windows
        .iter()
        .map(|&window| WindowReturn {
            window,
            percent: window_return(subject, window),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::domain::{Bar, StockSubject};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(d: NaiveDate, close: f64) -> Bar {
        Bar {
            date: d,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    fn subject() -> StockSubject {
        StockSubject::new(
            "LUCK",
            vec![
                bar(date(2023, 12, 29), 80.0),
                bar(date(2024, 2, 1), 90.0),
                bar(date(2024, 2, 26), 95.0),
                bar(date(2024, 2, 29), 98.0),
                bar(date(2024, 3, 1), 99.0),
                bar(date(2024, 3, 4), 100.0),
            ],
        )
    }

    #[test]
    fn codes_parse_back() {
        for w in ReturnWindow::DEFAULTS {
            assert_eq!(w.code().parse::<ReturnWindow>().unwrap(), w);
        }
        assert_eq!(" ytd ".parse::<ReturnWindow>().unwrap(), ReturnWindow::YearToDate);
        assert!("2Y".parse::<ReturnWindow>().is_err());
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&ReturnWindow::OneMonth).unwrap();
        assert_eq!(json, "\"1M\"");
    }

    #[test]
    fn start_dates() {
        let anchor = date(2024, 3, 4);
        assert_eq!(ReturnWindow::OneDay.start_date(anchor), date(2024, 3, 3));
        assert_eq!(ReturnWindow::OneWeek.start_date(anchor), date(2024, 2, 26));
        assert_eq!(ReturnWindow::OneMonth.start_date(anchor), date(2024, 2, 3));
        assert_eq!(ReturnWindow::YearToDate.start_date(anchor), date(2024, 1, 1));
    }

    #[test]
    fn one_day_falls_back_over_weekend() {
        // 3 Mar is a Sunday, so the start price is Friday's close.
        let r = window_return(&subject(), ReturnWindow::OneDay);
        assert_eq!(r, 1.01);
    }

    #[test]
    fn week_and_month() {
        let s = subject();
        assert_eq!(window_return(&s, ReturnWindow::OneWeek), 5.26);
        assert_eq!(window_return(&s, ReturnWindow::OneMonth), 11.11);
    }

    #[test]
    fn ytd_uses_last_close_of_previous_year() {
        assert_eq!(window_return(&subject(), ReturnWindow::YearToDate), 25.0);
    }

    #[test]
    fn missing_start_is_zero() {
        let s = StockSubject::new("NEW", vec![bar(date(2024, 3, 4), 10.0)]);
        assert_eq!(window_return(&s, ReturnWindow::OneWeek), 0.0);
        let empty = StockSubject::new("NONE", Vec::new());
        assert_eq!(window_return(&empty, ReturnWindow::OneDay), 0.0);
    }

    #[test]
    fn zero_start_is_zero() {
        assert_eq!(percentage_change(Some(0.0), Some(5.0)), 0.0);
        assert_eq!(percentage_change(None, Some(5.0)), 0.0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(percentage_change(Some(3.0), Some(2.0)), -33.33);
        // 0.01005 * 100 is 1.005 exactly in decimal.
        assert_eq!(percentage_change(Some(200.0), Some(202.01)), 1.01);
        assert_eq!(percentage_change(Some(200.0), Some(197.99)), -1.01);
        assert_eq!(percentage_change(Some(8.0), Some(8.09)), 1.13);
    }

    #[test]
    fn huge_prices_fall_back_to_binary_rounding() {
        assert_eq!(percentage_change(Some(1e30), Some(2e30)), 100.0);
    }

    #[test]
    fn returns_keep_window_order() {
        let windows = [ReturnWindow::YearToDate, ReturnWindow::OneDay];
        let out = window_returns(&subject(), &windows);
        assert_eq!(out[0].window, ReturnWindow::YearToDate);
        assert_eq!(out[1].window, ReturnWindow::OneDay);
    }
}
