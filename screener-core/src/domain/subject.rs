//! Subject: the stock (or index) a criterion is evaluated against.
//!
//! The engine never fetches price history itself. Whatever owns the history
//! implements `Subject`; argument sources read columns off it.

use std::sync::Arc;

use chrono::NaiveDate;

use super::bar::{column, Bar, PriceField};

/// Read-only view of a subject's aligned price history.
///
/// Implementations must be cheap to share across worker threads: the engine
/// evaluates many criteria against the same subject concurrently.
pub trait Subject: Send + Sync {
    /// Identifying ticker.
    fn symbol(&self) -> &str;

    /// Own bars, oldest first.
    fn bars(&self) -> &[Bar];

    /// Bars of the broad market index the subject trades against, oldest first.
    fn index_bars(&self) -> &[Bar];

    fn series(&self, field: PriceField) -> Vec<f64> {
        column(self.bars(), field)
    }

    fn index_series(&self, field: PriceField) -> Vec<f64> {
        column(self.index_bars(), field)
    }

    /// Close of the most recent bar.
    fn latest_price(&self) -> Option<f64> {
        self.bars().last().map(|b| b.close)
    }

    fn last_date(&self) -> Option<NaiveDate> {
        self.bars().last().map(|b| b.date)
    }

    /// Close of the latest bar dated on or before `date`.
    fn price_on(&self, date: NaiveDate) -> Option<f64> {
        let bars = self.bars();
        let idx = bars.partition_point(|b| b.date <= date);
        if idx == 0 {
            None
        } else {
            Some(bars[idx - 1].close)
        }
    }

    /// Key identifying this subject's current history for caching.
    ///
    /// Changes whenever a bar is appended, so cached evaluations never outlive
    /// the data they were computed from.
    fn cache_key(&self) -> String {
        match self.last_date() {
            Some(d) => format!("{}@{}#{}", self.symbol(), d, self.bars().len()),
            None => format!("{}@empty", self.symbol()),
        }
    }
}

impl<T: Subject + ?Sized> Subject for &T {
    fn symbol(&self) -> &str {
        (**self).symbol()
    }

    fn bars(&self) -> &[Bar] {
        (**self).bars()
    }

    fn index_bars(&self) -> &[Bar] {
        (**self).index_bars()
    }

    fn latest_price(&self) -> Option<f64> {
        (**self).latest_price()
    }

    fn price_on(&self, date: NaiveDate) -> Option<f64> {
        (**self).price_on(date)
    }

    fn cache_key(&self) -> String {
        (**self).cache_key()
    }
}

/// In-memory subject: a symbol, its bars, and a shared index history.
#[derive(Debug, Clone)]
pub struct StockSubject {
    symbol: String,
    bars: Vec<Bar>,
    index: Arc<Vec<Bar>>,
}

impl StockSubject {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            index: Arc::new(Vec::new()),
        }
    }

    /// Attach the market index history. Many subjects typically share one.
    pub fn with_index(mut self, index: Arc<Vec<Bar>>) -> Self {
        self.index = index;
        self
    }
}

impl Subject for StockSubject {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn bars(&self) -> &[Bar] {
        &self.bars
    }

    fn index_bars(&self) -> &[Bar] {
        &self.index
    }
}
