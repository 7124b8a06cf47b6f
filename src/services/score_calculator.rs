use std::collections::BTreeMap;

use crate::error::EngineResult;
use crate::models::metrics::{ActivityType, MonthlyMetrics, QualityMetric};
use crate::models::score::{
    MonthlyScore, ScoreBreakdown, ScoreRequirements, ScoreTier, MAX_BASE_ENGAGEMENT,
    MAX_CONSISTENCY_BONUSES, MAX_EXCELLENCE_BONUSES, MAX_QUALITY_MULTIPLIERS,
};
use crate::utils::month;
use crate::utils::round2;

// Base engagement thresholds are additive: every satisfied tier stacks.
const ENGAGEMENT_RATE_TIER_1: f64 = 0.50;
const ENGAGEMENT_RATE_TIER_2: f64 = 0.70;
const ENGAGEMENT_RATE_TIER_3: f64 = 0.85;

const FOCUS_TIME_BASE_HOURS: f64 = 5.0;
const FOCUS_TIME_EXCELLENCE_HOURS: f64 = 15.0;

const JOURNAL_CONSISTENCY_TARGET: f64 = 30.0;
const MEDITATION_CONSISTENCY_TARGET: f64 = 20.0;

const EXCELLENCE_HABIT_MINIMUM: u32 = 3;
const EXCELLENCE_HABIT_RATE: f64 = 0.80;
const EXCELLENCE_JOURNAL_ENTRIES: u32 = 20;
const EXCELLENCE_MEDITATION_SESSIONS: u32 = 16;

/// Pure scoring formula. Deterministic, no I/O, safe to call concurrently.
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Turn one month of metrics and quality samples into a bounded score.
    pub fn calculate(
        metrics: &MonthlyMetrics,
        quality_metrics: &[QualityMetric],
        month_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<MonthlyScore> {
        let (year, month_number) = month::parse_month_id(month_id)?;
        let days_in_month = month::days_in_month(year, month_number) as f64;

        let breakdown = ScoreBreakdown {
            base_engagement: round2(Self::base_engagement(metrics, days_in_month)),
            quality_multipliers: round2(Self::quality_multipliers(quality_metrics)),
            consistency_bonuses: round2(Self::consistency_bonuses(metrics)),
            excellence_bonuses: round2(Self::excellence_bonuses(metrics)),
        };

        let score = round2(breakdown.total());

        Ok(MonthlyScore {
            month: month_id.to_string(),
            user_id: user_id.map(|id| id.to_string()),
            score,
            tier: ScoreTier::from_score(score),
            breakdown,
            requirements: ScoreRequirements::from_metrics(metrics),
        })
    }

    /// Base engagement, capped at 50. Rate thresholds stack.
    fn base_engagement(metrics: &MonthlyMetrics, days_in_month: f64) -> f64 {
        let rate = if days_in_month > 0.0 {
            metrics.active_days as f64 / days_in_month
        } else {
            0.0
        };

        let mut points: f64 = 0.0;
        if rate >= ENGAGEMENT_RATE_TIER_1 {
            points += 20.0;
        }
        if rate >= ENGAGEMENT_RATE_TIER_2 {
            points += 15.0;
        }
        if rate >= ENGAGEMENT_RATE_TIER_3 {
            points += 10.0;
        }

        if metrics.pomodoro_sessions > 0 {
            points += 5.0;
        }
        if metrics.total_focus_time >= FOCUS_TIME_BASE_HOURS {
            points += 10.0;
        }
        if metrics.journal_entries > 0 {
            points += 5.0;
        }
        if metrics.mood_entries > 0 {
            points += 5.0;
        }

        points.min(MAX_BASE_ENGAGEMENT)
    }

    /// Weighted mean of per-type adjusted quality, capped at 25.
    ///
    /// Quality below the 1-10 midpoint contributes nothing rather than
    /// subtracting points.
    fn quality_multipliers(quality_metrics: &[QualityMetric]) -> f64 {
        if quality_metrics.is_empty() {
            return 0.0;
        }

        let mut groups: BTreeMap<ActivityType, (f64, u32)> = BTreeMap::new();
        for sample in quality_metrics {
            let entry = groups.entry(sample.activity_type).or_insert((0.0, 0));
            entry.0 += sample.quality_score;
            entry.1 += 1;
        }

        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for (activity_type, (total, count)) in groups {
            let avg_quality = total / count as f64;
            let adjusted = ((avg_quality - 5.0) * 2.0).max(0.0);
            let weight = activity_type.weight();
            weighted_sum += adjusted * weight;
            weight_sum += weight;
        }

        if weight_sum <= 0.0 {
            return 0.0;
        }

        (weighted_sum / weight_sum).min(MAX_QUALITY_MULTIPLIERS)
    }

    /// Consistency bonuses, capped at 15. Unlike base engagement, each
    /// ladder here is exclusive: only the highest satisfied tier applies.
    fn consistency_bonuses(metrics: &MonthlyMetrics) -> f64 {
        let mut points: f64 = 0.0;

        let habit_rate = metrics.habit_completion_rate();
        if habit_rate >= 0.80 {
            points += 8.0;
        } else if habit_rate >= 0.60 {
            points += 5.0;
        } else if habit_rate >= 0.40 {
            points += 2.0;
        }

        let journal_rate = metrics.journal_entries as f64 / JOURNAL_CONSISTENCY_TARGET;
        if journal_rate >= 0.50 {
            points += 4.0;
        } else if journal_rate >= 0.30 {
            points += 2.0;
        }

        let meditation_rate = metrics.meditation_sessions as f64 / MEDITATION_CONSISTENCY_TARGET;
        if meditation_rate >= 0.60 {
            points += 3.0;
        } else if meditation_rate >= 0.40 {
            points += 1.0;
        }

        points.min(MAX_CONSISTENCY_BONUSES)
    }

    /// Excellence bonuses for clearing the "perfect month" minimums, capped at 10.
    fn excellence_bonuses(metrics: &MonthlyMetrics) -> f64 {
        let mut points: f64 = 0.0;

        if metrics.total_habits >= EXCELLENCE_HABIT_MINIMUM
            && metrics.habit_completion_rate() >= EXCELLENCE_HABIT_RATE
        {
            points += 3.0;
        }
        if metrics.total_focus_time >= FOCUS_TIME_EXCELLENCE_HOURS {
            points += 3.0;
        }
        if metrics.journal_entries >= EXCELLENCE_JOURNAL_ENTRIES {
            points += 2.0;
        }
        if metrics.meditation_sessions >= EXCELLENCE_MEDITATION_SESSIONS {
            points += 2.0;
        }

        points.min(MAX_EXCELLENCE_BONUSES)
    }
}
