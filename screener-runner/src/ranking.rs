//! Ranking: criteria outcomes → percentage score → stock profile rows.
//!
//! Profiles for a batch of subjects are built concurrently inside the
//! engine's pool. Criteria evaluations go through a short-TTL cache so that
//! repeated rankings of the same stock set within the TTL reuse outcomes.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use screener_core::criteria::Criteria;
use screener_core::domain::{CriterionId, Subject};
use screener_core::{CriterionStatus, EngineError, EvaluationEngine, Outcomes};

use crate::cache::{CacheKey, CacheStats, EvaluationCache};
use crate::config::{ConfigError, ScreenerConfig};
use crate::returns::{window_returns, ReturnWindow, WindowReturn};
use crate::universe::{select_subjects, StockSet, StockSetCatalog};

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("Cannot rank an empty set of outcomes")]
    EmptyOutcomes,
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ─── Scoring ─────────────────────────────────────────────────────────

/// `round(sum(ordinals) / count * 100)` over the given statuses.
///
/// Ties round to the even integer (1 of 8 is 12). An empty input is an error.
pub fn calculate_percentage_ranking<'a, I>(statuses: I) -> Result<u8, RankingError>
where
    I: IntoIterator<Item = &'a CriterionStatus>,
{
    let (score, count) = statuses
        .into_iter()
        .fold((0u64, 0u64), |(score, count), status| {
            (score + u64::from(status.ordinal()), count + 1)
        });
    if count == 0 {
        return Err(RankingError::EmptyOutcomes);
    }
    let expected = count * u64::from(CriterionStatus::Passed.ordinal());
    let pct = (score as f64 / expected as f64 * 100.0).round_ties_even();
    Ok(pct.clamp(0.0, 100.0) as u8)
}

// ─── Profiles ────────────────────────────────────────────────────────

/// Outcome of one criterion within a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionOutcome {
    pub id: CriterionId,
    pub criterion: String,
    pub status: CriterionStatus,
}

/// One row of a risk profile table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockProfile {
    pub symbol: String,
    pub latest_price: Option<f64>,
    pub returns: Vec<WindowReturn>,
    /// In the order the criteria were given.
    pub outcomes: Vec<CriterionOutcome>,
    /// Percentage of criteria passed, 0..=100.
    pub ranking: u8,
}

impl StockProfile {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_passed()).count()
    }
}

/// Order `outcomes` by `criteria` for output.
fn ordered_outcomes(criteria: &Criteria, outcomes: &Outcomes) -> Vec<CriterionOutcome> {
    criteria
        .iter()
        .filter_map(|criterion| {
            outcomes.get(criterion).map(|&status| CriterionOutcome {
                id: criterion.id(),
                criterion: criterion.to_string(),
                status,
            })
        })
        .collect()
}

// ─── Service ─────────────────────────────────────────────────────────

/// Builds stock profiles with an engine, a cache and reporting windows.
pub struct RankingService<'r> {
    engine: EvaluationEngine<'r>,
    cache: EvaluationCache,
    windows: Vec<ReturnWindow>,
    ignore_unsupported: bool,
}

impl RankingService<'static> {
    /// Service over the process-wide registries, configured by `config`.
    pub fn from_config(config: &ScreenerConfig) -> Result<Self, RankingError> {
        let windows = config.windows()?;
        let engine = EvaluationEngine::global()
            .with_worker_threads(config.worker_threads)?
            .parallel_arguments(config.parallel_arguments);
        Ok(Self::new(engine)
            .with_cache(EvaluationCache::new(config.cache_ttl()))
            .with_windows(windows)
            .ignore_unsupported(config.ignore_unsupported_functions))
    }
}

impl<'r> RankingService<'r> {
    /// Default windows, default cache, unsupported functions suppressed.
    pub fn new(engine: EvaluationEngine<'r>) -> Self {
        Self {
            engine,
            cache: EvaluationCache::default(),
            windows: ReturnWindow::DEFAULTS.to_vec(),
            ignore_unsupported: true,
        }
    }

    pub fn with_cache(mut self, cache: EvaluationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_windows(mut self, windows: Vec<ReturnWindow>) -> Self {
        self.windows = windows;
        self
    }

    pub fn ignore_unsupported(mut self, ignore: bool) -> Self {
        self.ignore_unsupported = ignore;
        self
    }

    pub fn engine(&self) -> &EvaluationEngine<'r> {
        &self.engine
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }

    /// `evaluate_criteria` through the TTL cache.
    pub fn evaluate(
        &self,
        subject: &dyn Subject,
        criteria: &Criteria,
    ) -> Result<Outcomes, EngineError> {
        let key = self
            .cache
            .is_enabled()
            .then(|| CacheKey::new(subject, criteria))
            .flatten();
        self.cache.get_or_try_insert_with(key, || {
            self.engine
                .evaluate_criteria(subject, criteria, self.ignore_unsupported)
        })
    }

    pub fn generate_stock_profile(
        &self,
        subject: &dyn Subject,
        criteria: &Criteria,
    ) -> Result<StockProfile, RankingError> {
        let outcomes = self.evaluate(subject, criteria)?;
        let ranking = calculate_percentage_ranking(outcomes.values())?;
        Ok(StockProfile {
            symbol: subject.symbol().to_string(),
            latest_price: subject.latest_price(),
            returns: window_returns(subject, &self.windows),
            outcomes: ordered_outcomes(criteria, &outcomes),
            ranking,
        })
    }

    /// Profile every subject concurrently. Output order follows `subjects`.
    ///
    /// The first failing subject fails the whole batch.
    pub fn generate_stocks_risk_profile<S: Subject>(
        &self,
        subjects: &[S],
        criteria: &Criteria,
    ) -> Result<Vec<StockProfile>, RankingError> {
        if subjects.is_empty() {
            return Ok(Vec::new());
        }
        let started = Instant::now();
        tracing::info!(
            subjects = subjects.len(),
            criteria = criteria.len(),
            workers = self.engine.worker_threads(),
            "ranking started"
        );

        let profiles = self.engine.install(|| {
            subjects
                .par_iter()
                .map(|subject| self.generate_stock_profile(subject, criteria))
                .collect::<Result<Vec<_>, _>>()
        })?;

        let stats = self.cache.stats();
        tracing::info!(
            profiles = profiles.len(),
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ranking finished"
        );
        Ok(profiles)
    }

    /// Rank the members of `set` found in `pool`.
    pub fn rank_stock_set<S: Subject>(
        &self,
        catalog: &StockSetCatalog,
        set: &StockSet,
        pool: &[S],
        criteria: &Criteria,
    ) -> Result<Vec<StockProfile>, RankingError> {
        let members = select_subjects(catalog, set, pool);
        self.generate_stocks_risk_profile(&members, criteria)
    }
}
