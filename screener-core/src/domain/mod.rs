//! Domain types: bars, price subjects, identifiers.

pub mod bar;
pub mod ids;
pub mod subject;

pub use bar::{column, Bar, PriceField};
pub use ids::CriterionId;
pub use subject::{StockSubject, Subject};
