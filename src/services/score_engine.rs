use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::analytics::MonthlyAnalytics;
use crate::models::metrics::MonthlyMetrics;
use crate::models::score::{
    MonthProgress, MonthlyScore, ScoreHistoryEntry, ScoreRequirements, ScoreTier,
    TIER_2_THRESHOLD, TIER_3_THRESHOLD,
};
use crate::models::sources::DataSources;
use crate::services::cache_service::{CacheKey, EngineCache, InMemoryCache};
use crate::services::metric_aggregator::MetricAggregator;
use crate::services::score_calculator::ScoreCalculator;
use crate::services::score_validator::ScoreValidator;
use crate::utils::month;
use crate::utils::round2;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of each in-memory cache store.
    pub cache_capacity: usize,
    /// Months returned by `get_score_history` when the caller passes 0.
    pub default_history_months: u32,
    /// Accepted year range for month identifiers.
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            default_history_months: 12,
            min_year: 2020,
            max_year: 2030,
        }
    }
}

/// Public entry point of the scoring engine. Orchestrates the aggregator,
/// calculator, validator and cache for single months, multi-month history
/// and current-month progress.
///
/// Construct one per process and share it by reference; there is no global
/// state. Concurrent duplicate calculations for the same key are allowed
/// and resolve by recompute-and-overwrite.
pub struct ScoreEngine {
    aggregator: MetricAggregator,
    validator: ScoreValidator,
    cache: Arc<dyn EngineCache>,
    config: EngineConfig,
}

impl ScoreEngine {
    pub fn new(sources: DataSources, config: EngineConfig) -> Self {
        let cache: Arc<dyn EngineCache> = Arc::new(InMemoryCache::new(config.cache_capacity));
        Self::with_cache(sources, cache, config)
    }

    /// Wire the engine against an externally owned cache implementation.
    pub fn with_cache(
        sources: DataSources,
        cache: Arc<dyn EngineCache>,
        config: EngineConfig,
    ) -> Self {
        let validator = ScoreValidator::new(config.min_year, config.max_year);
        let aggregator = MetricAggregator::new(sources, Arc::clone(&cache), validator.clone());
        Self {
            aggregator,
            validator,
            cache,
            config,
        }
    }

    /// Compute (or serve from cache) the month's productivity score.
    ///
    /// `force_recalculate` bypasses and refreshes the cache. Structural or
    /// consistency validation errors abort the request; warnings are
    /// logged and do not block.
    pub async fn calculate_monthly_score(
        &self,
        month_id: &str,
        user_id: Option<&str>,
        force_recalculate: bool,
    ) -> EngineResult<MonthlyScore> {
        month::parse_month_id(month_id)?;

        let key = CacheKey::new(month_id, user_id);
        if force_recalculate {
            self.cache.invalidate(&key);
        } else if let Some(cached) = self.cache.get_score(&key) {
            debug!(target: "engine::score", month = month_id, "serving cached score");
            return Ok(cached);
        }

        let metrics = self.aggregator.gather_monthly_metrics(month_id, user_id).await?;
        let quality = self.aggregator.gather_quality_metrics(month_id, user_id).await?;

        let score = ScoreCalculator::calculate(&metrics, &quality, month_id, user_id)?;

        let mut report = self.validator.validate_monthly_score(&score);
        report.extend(self.validator.validate_score_consistency(&score, &metrics));
        if !report.is_valid() {
            return Err(EngineError::validation_with_details(
                format!("monthly score for {month_id} failed validation"),
                json!({ "month": month_id, "errors": report.errors }),
            ));
        }

        self.cache.put_score(key, score.clone());
        info!(
            target: "engine::score",
            month = month_id,
            score = score.score,
            tier = score.tier.as_str(),
            "monthly score calculated"
        );

        Ok(score)
    }

    /// Gather a fresh `MonthlyMetrics` record for the month (also writes
    /// it to the cache).
    pub async fn gather_monthly_metrics(
        &self,
        month_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<MonthlyMetrics> {
        self.aggregator.gather_monthly_metrics(month_id, user_id).await
    }

    /// Derived activity analytics for the month, cached by `(month, user)`.
    pub async fn get_monthly_analytics(
        &self,
        month_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<MonthlyAnalytics> {
        month::parse_month_id(month_id)?;

        let key = CacheKey::new(month_id, user_id);
        if let Some(cached) = self.cache.get_analytics(&key) {
            debug!(target: "engine::score", month = month_id, "serving cached analytics");
            return Ok(cached);
        }

        self.aggregator.gather_monthly_analytics(month_id, user_id).await
    }

    /// Score history for the last `months_back` months (current month
    /// included), ascending by month. A month whose calculation fails is
    /// logged and omitted; history never fails wholesale.
    pub async fn get_score_history(
        &self,
        months_back: u32,
        user_id: Option<&str>,
    ) -> EngineResult<Vec<ScoreHistoryEntry>> {
        let months_back = if months_back == 0 {
            self.config.default_history_months
        } else {
            months_back
        };
        let current = month::current_month_id();

        let mut scores = Vec::new();
        for offset in (0..months_back).rev() {
            let month_id = month::months_before(&current, offset)?;
            match self
                .calculate_monthly_score(&month_id, user_id, false)
                .await
            {
                Ok(score) => scores.push(score),
                Err(err) => {
                    warn!(
                        target: "engine::score",
                        month = %month_id,
                        error = %err,
                        "skipping month in score history"
                    );
                }
            }
        }

        let mut history = Vec::with_capacity(scores.len());
        let mut previous_score: Option<f64> = None;
        for score in scores {
            history.push(ScoreHistoryEntry {
                change_from_previous: previous_score.map(|prev| round2(score.score - prev)),
                month: score.month.clone(),
                score: score.score,
                tier: score.tier,
                breakdown: score.breakdown,
            });
            previous_score = Some(score.score);
        }

        Ok(history)
    }

    /// Current-month score plus distance to the next tier.
    pub async fn get_current_month_progress(
        &self,
        user_id: Option<&str>,
    ) -> EngineResult<MonthProgress> {
        let month_id = month::current_month_id();
        let score = self
            .calculate_monthly_score(&month_id, user_id, false)
            .await?;

        let today = Utc::now().date_naive();
        let days_in_month = month::days_in_month(today.year(), today.month());
        let days_remaining = days_in_month.saturating_sub(today.day());

        let (next_tier, progress, missing) = match score.tier {
            ScoreTier::Tier3 => (None, 100.0, Vec::new()),
            ScoreTier::Tier2 => {
                let progress =
                    ((score.score - TIER_2_THRESHOLD) / (TIER_3_THRESHOLD - TIER_2_THRESHOLD))
                        * 100.0;
                (
                    Some(ScoreTier::Tier3),
                    round2(progress.clamp(0.0, 100.0)),
                    missing_requirements(&score.requirements, ScoreTier::Tier3, days_in_month),
                )
            }
            ScoreTier::Tier1 => {
                let progress = (score.score / TIER_2_THRESHOLD) * 100.0;
                (
                    Some(ScoreTier::Tier2),
                    round2(progress.clamp(0.0, 100.0)),
                    missing_requirements(&score.requirements, ScoreTier::Tier2, days_in_month),
                )
            }
        };

        Ok(MonthProgress {
            month: month_id,
            current_score: score.score,
            tier: score.tier,
            next_tier,
            progress_to_next_tier: progress,
            missing_requirements: missing,
            days_remaining,
        })
    }

    /// Invalidate the month's cached data and re-run the full pipeline.
    pub async fn refresh_monthly_data(
        &self,
        month_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<()> {
        let key = CacheKey::new(month_id, user_id);
        self.cache.invalidate(&key);

        self.calculate_monthly_score(month_id, user_id, true).await?;
        self.aggregator
            .gather_monthly_analytics(month_id, user_id)
            .await?;

        info!(target: "engine::score", month = month_id, "monthly data refreshed");
        Ok(())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Human-readable deltas toward the target tier's requirement profile.
fn missing_requirements(
    requirements: &ScoreRequirements,
    target_tier: ScoreTier,
    days_in_month: u32,
) -> Vec<String> {
    // Target profiles: what a month at that tier typically needs.
    let (active_rate, focus_hours, journal_entries, meditation_sessions, habit_rate) =
        match target_tier {
            ScoreTier::Tier3 => (0.85, 15.0, 20, 16, 0.80),
            _ => (0.50, 5.0, 1, 0, 0.60),
        };

    let mut missing = Vec::new();

    let active_target = (active_rate * days_in_month as f64).ceil() as u32;
    if requirements.active_days < active_target {
        missing.push(format!(
            "{} more active days",
            active_target - requirements.active_days
        ));
    }
    if requirements.total_focus_time < focus_hours {
        missing.push(format!(
            "{:.1} more focus hours",
            focus_hours - requirements.total_focus_time
        ));
    }
    if requirements.journal_entries < journal_entries {
        missing.push(format!(
            "{} more journal entries",
            journal_entries - requirements.journal_entries
        ));
    }
    if requirements.meditation_sessions < meditation_sessions {
        missing.push(format!(
            "{} more meditation sessions",
            meditation_sessions - requirements.meditation_sessions
        ));
    }
    if requirements.habit_completion_rate < habit_rate {
        missing.push(format!(
            "raise habit completion rate to {:.0}%",
            habit_rate * 100.0
        ));
    }

    missing
}
