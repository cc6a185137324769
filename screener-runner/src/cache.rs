//! Short-lived in-memory cache of criteria evaluations.
//!
//! Entries are keyed by the subject's history key and a blake3 fingerprint
//! of the criteria, and expire lazily after a fixed TTL. Once the map holds
//! [`PURGE_THRESHOLD`] entries, each insert first sweeps out expired ones.
//! Failed evaluations are never stored.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use screener_core::criteria::{to_records, Criteria};
use screener_core::domain::Subject;
use screener_core::Outcomes;

/// Map size at which inserts start sweeping expired entries.
pub const PURGE_THRESHOLD: usize = 256;

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Identity of one `(subject, criteria)` evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    subject: String,
    criteria: String,
}

impl CacheKey {
    pub fn new(subject: &dyn Subject, criteria: &Criteria) -> Option<Self> {
        Some(Self {
            subject: subject.cache_key(),
            criteria: criteria_fingerprint(criteria)?,
        })
    }
}

/// blake3 over the criteria's records, sorted by id.
///
/// Independent of insertion order; changes if any id, function, kwarg or
/// operator changes.
pub fn criteria_fingerprint(criteria: &Criteria) -> Option<String> {
    let mut records = to_records(criteria);
    records.sort_by(|a, b| a.id.cmp(&b.id));

    let mut hasher = blake3::Hasher::new();
    if let Err(err) = serde_json::to_writer(&mut hasher, &records) {
        tracing::warn!(error = %err, "could not fingerprint criteria, bypassing cache");
        return None;
    }
    Some(hasher.finalize().to_hex().to_string())
}

/// TTL cache of `evaluate_criteria` results.
pub struct EvaluationCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry<Outcomes>>>,
    /// `None` disables caching entirely.
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EvaluationCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: ttl.filter(|t| !t.is_zero()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache that stores nothing.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Cached outcomes if present and not expired.
    pub fn get(&self, key: &CacheKey) -> Option<Outcomes> {
        self.ttl?;
        let cache = self.entries.read().ok()?;
        let hit = cache
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.data.clone());
        let counter = if hit.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        hit
    }

    pub fn insert(&self, key: CacheKey, outcomes: Outcomes) {
        let Some(ttl) = self.ttl else {
            return;
        };
        if let Ok(mut cache) = self.entries.write() {
            if cache.len() >= PURGE_THRESHOLD {
                let before = cache.len();
                cache.retain(|_, entry| !entry.is_expired());
                tracing::debug!(purged = before - cache.len(), "evaluation cache swept");
            }
            cache.insert(key, CacheEntry::new(outcomes, ttl));
        }
    }

    /// Return the cached outcomes for `key`, or compute and store them.
    ///
    /// An `Err` from `compute` is returned as-is and leaves the cache
    /// untouched.
    pub fn get_or_try_insert_with<E, F>(
        &self,
        key: Option<CacheKey>,
        compute: F,
    ) -> Result<Outcomes, E>
    where
        F: FnOnce() -> Result<Outcomes, E>,
    {
        let Some(key) = key.filter(|_| self.is_enabled()) else {
            return compute();
        };
        if let Some(hit) = self.get(&key) {
            tracing::debug!(subject = %key.subject, "evaluation cache hit");
            return Ok(hit);
        }
        let outcomes = compute()?;
        self.insert(key, outcomes.clone());
        Ok(outcomes)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        match self.entries.write() {
            Ok(mut cache) => {
                let before = cache.len();
                cache.retain(|_, entry| !entry.is_expired());
                before - cache.len()
            }
            Err(_) => 0,
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let (total, expired) = self
            .entries
            .read()
            .map(|c| (c.len(), c.values().filter(|e| e.is_expired()).count()))
            .unwrap_or((0, 0));

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for EvaluationCache {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(30)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
    pub hits: u64,
    pub misses: u64,
}
