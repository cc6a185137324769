//! Screener Runner: configuration, stock sets, return windows, cached ranking.
//!
//! This crate builds on `screener-core` to provide:
//! - TOML configuration for the evaluation pool, cache and report windows
//! - Stock sets (index memberships and custom lists) loaded from TOML
//! - Calendar-window percentage returns
//! - A short-TTL cache of criteria evaluations
//! - Percentage ranking and concurrent stock-profile generation

pub mod cache;
pub mod config;
pub mod ranking;
pub mod returns;
pub mod universe;

pub use cache::{criteria_fingerprint, CacheKey, CacheStats, EvaluationCache};
pub use config::{ConfigError, ScreenerConfig};
pub use ranking::{
    calculate_percentage_ranking, CriterionOutcome, RankingError, RankingService, StockProfile,
};
pub use returns::{percentage_change, window_return, window_returns, ReturnWindow, WindowReturn};
pub use universe::{select_subjects, StockSet, StockSetCatalog, StockSetError};
