use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use tracing::debug;

use crate::models::analytics::MonthlyAnalytics;
use crate::models::metrics::MonthlyMetrics;
use crate::models::score::MonthlyScore;

/// Composite cache key: one slot per month and user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub month_id: String,
    pub user_id: Option<String>,
}

impl CacheKey {
    pub fn new(month_id: impl Into<String>, user_id: Option<&str>) -> Self {
        Self {
            month_id: month_id.into(),
            user_id: user_id.map(|id| id.to_string()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user_id {
            Some(user) => write!(f, "{}:{}", self.month_id, user),
            None => write!(f, "{}:-", self.month_id),
        }
    }
}

/// Month-keyed store for computed scores, metrics and analytics.
///
/// The engine only talks to this trait, so the backing store is swappable
/// without touching the scoring logic.
pub trait EngineCache: Send + Sync {
    fn get_score(&self, key: &CacheKey) -> Option<MonthlyScore>;
    fn put_score(&self, key: CacheKey, value: MonthlyScore);

    fn get_metrics(&self, key: &CacheKey) -> Option<MonthlyMetrics>;
    fn put_metrics(&self, key: CacheKey, value: MonthlyMetrics);

    fn get_analytics(&self, key: &CacheKey) -> Option<MonthlyAnalytics>;
    fn put_analytics(&self, key: CacheKey, value: MonthlyAnalytics);

    /// Drop every cached value for the key.
    fn invalidate(&self, key: &CacheKey);

    fn clear(&self);
}

/// Default in-process cache backed by per-kind LRU maps.
pub struct InMemoryCache {
    scores: Mutex<LruCache<CacheKey, MonthlyScore>>,
    metrics: Mutex<LruCache<CacheKey, MonthlyMetrics>>,
    analytics: Mutex<LruCache<CacheKey, MonthlyAnalytics>>,
}

impl InMemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least one");
        Self {
            scores: Mutex::new(LruCache::new(capacity)),
            metrics: Mutex::new(LruCache::new(capacity)),
            analytics: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock<T>(store: &Mutex<LruCache<CacheKey, T>>) -> MutexGuard<'_, LruCache<CacheKey, T>> {
        // A poisoned lock only means a panic mid-insert; the map itself
        // stays usable.
        match store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl EngineCache for InMemoryCache {
    fn get_score(&self, key: &CacheKey) -> Option<MonthlyScore> {
        let found = Self::lock(&self.scores).get(key).cloned();
        debug!(target: "engine::cache", key = %key, hit = found.is_some(), "score lookup");
        found
    }

    fn put_score(&self, key: CacheKey, value: MonthlyScore) {
        debug!(target: "engine::cache", key = %key, "score stored");
        Self::lock(&self.scores).put(key, value);
    }

    fn get_metrics(&self, key: &CacheKey) -> Option<MonthlyMetrics> {
        let found = Self::lock(&self.metrics).get(key).cloned();
        debug!(target: "engine::cache", key = %key, hit = found.is_some(), "metrics lookup");
        found
    }

    fn put_metrics(&self, key: CacheKey, value: MonthlyMetrics) {
        debug!(target: "engine::cache", key = %key, "metrics stored");
        Self::lock(&self.metrics).put(key, value);
    }

    fn get_analytics(&self, key: &CacheKey) -> Option<MonthlyAnalytics> {
        let found = Self::lock(&self.analytics).get(key).cloned();
        debug!(target: "engine::cache", key = %key, hit = found.is_some(), "analytics lookup");
        found
    }

    fn put_analytics(&self, key: CacheKey, value: MonthlyAnalytics) {
        debug!(target: "engine::cache", key = %key, "analytics stored");
        Self::lock(&self.analytics).put(key, value);
    }

    fn invalidate(&self, key: &CacheKey) {
        Self::lock(&self.scores).pop(key);
        Self::lock(&self.metrics).pop(key);
        Self::lock(&self.analytics).pop(key);
        debug!(target: "engine::cache", key = %key, "invalidated");
    }

    fn clear(&self) {
        Self::lock(&self.scores).clear();
        Self::lock(&self.metrics).clear();
        Self::lock(&self.analytics).clear();
        debug!(target: "engine::cache", "cleared all entries");
    }
}
