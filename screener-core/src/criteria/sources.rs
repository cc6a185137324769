//! Argument sources: pure functions reading one input series off a subject.

use std::fmt;

use crate::domain::{PriceField, Subject};

use super::error::CriteriaError;

type Fetch = fn(&dyn Subject) -> Vec<f64>;

/// One positional input of a function, read from the subject being evaluated.
#[derive(Clone, Copy)]
pub struct ArgumentSource {
    name: &'static str,
    fetch: Fetch,
}

fn open(s: &dyn Subject) -> Vec<f64> {
    s.series(PriceField::Open)
}

fn high(s: &dyn Subject) -> Vec<f64> {
    s.series(PriceField::High)
}

fn low(s: &dyn Subject) -> Vec<f64> {
    s.series(PriceField::Low)
}

fn close(s: &dyn Subject) -> Vec<f64> {
    s.series(PriceField::Close)
}

fn volume(s: &dyn Subject) -> Vec<f64> {
    s.series(PriceField::Volume)
}

fn index_close(s: &dyn Subject) -> Vec<f64> {
    s.index_series(PriceField::Close)
}

impl ArgumentSource {
    pub const OPEN: ArgumentSource = ArgumentSource::new("open", open);
    pub const HIGH: ArgumentSource = ArgumentSource::new("high", high);
    pub const LOW: ArgumentSource = ArgumentSource::new("low", low);
    pub const CLOSE: ArgumentSource = ArgumentSource::new("close", close);
    pub const VOLUME: ArgumentSource = ArgumentSource::new("volume", volume);
    pub const INDEX_CLOSE: ArgumentSource = ArgumentSource::new("index_close", index_close);

    pub const fn new(name: &'static str, fetch: Fetch) -> Self {
        Self { name, fetch }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the series for `function`. An empty series is an evaluation error.
    pub fn resolve(&self, function: &str, subject: &dyn Subject) -> Result<Vec<f64>, CriteriaError> {
        let values = (self.fetch)(subject);
        if values.is_empty() {
            return Err(CriteriaError::EmptySeries {
                function: function.to_string(),
                source_name: self.name.to_string(),
            });
        }
        Ok(values)
    }
}

impl fmt::Debug for ArgumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArgumentSource").field(&self.name).finish()
    }
}
