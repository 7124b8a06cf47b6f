use serde::{Deserialize, Serialize};

use crate::models::metrics::MonthlyMetrics;

pub const MAX_BASE_ENGAGEMENT: f64 = 50.0;
pub const MAX_QUALITY_MULTIPLIERS: f64 = 25.0;
pub const MAX_CONSISTENCY_BONUSES: f64 = 15.0;
pub const MAX_EXCELLENCE_BONUSES: f64 = 10.0;

pub const TIER_2_THRESHOLD: f64 = 50.0;
pub const TIER_3_THRESHOLD: f64 = 80.0;

/// Three-band classification of a monthly score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScoreTier {
    #[serde(rename = "TIER_1")]
    Tier1,
    #[serde(rename = "TIER_2")]
    Tier2,
    #[serde(rename = "TIER_3")]
    Tier3,
}

impl ScoreTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTier::Tier1 => "TIER_1",
            ScoreTier::Tier2 => "TIER_2",
            ScoreTier::Tier3 => "TIER_3",
        }
    }

    /// Tier implied by a score under the documented thresholds.
    pub fn from_score(score: f64) -> Self {
        if score >= TIER_3_THRESHOLD {
            ScoreTier::Tier3
        } else if score >= TIER_2_THRESHOLD {
            ScoreTier::Tier2
        } else {
            ScoreTier::Tier1
        }
    }

    pub fn next(&self) -> Option<ScoreTier> {
        match self {
            ScoreTier::Tier1 => Some(ScoreTier::Tier2),
            ScoreTier::Tier2 => Some(ScoreTier::Tier3),
            ScoreTier::Tier3 => None,
        }
    }
}

/// The four independently capped score components. Their sum is the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// 0-50.
    pub base_engagement: f64,
    /// 0-25.
    pub quality_multipliers: f64,
    /// 0-15.
    pub consistency_bonuses: f64,
    /// 0-10.
    pub excellence_bonuses: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base_engagement
            + self.quality_multipliers
            + self.consistency_bonuses
            + self.excellence_bonuses
    }
}

/// Denormalized snapshot of the metrics a score was derived from, kept for
/// display and history without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequirements {
    pub active_days: u32,
    pub total_focus_time: f64,
    pub meditation_sessions: u32,
    pub journal_entries: u32,
    pub habit_completion_rate: f64,
    pub completed_goals: u32,
}

impl ScoreRequirements {
    pub fn from_metrics(metrics: &MonthlyMetrics) -> Self {
        Self {
            active_days: metrics.active_days,
            total_focus_time: metrics.total_focus_time,
            meditation_sessions: metrics.meditation_sessions,
            journal_entries: metrics.journal_entries,
            habit_completion_rate: metrics.habit_completion_rate(),
            completed_goals: metrics.completed_goals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyScore {
    pub month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// 0-100, rounded to two decimals.
    pub score: f64,
    pub tier: ScoreTier,
    pub breakdown: ScoreBreakdown,
    pub requirements: ScoreRequirements,
}

/// One month of score history with the delta against the previous month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreHistoryEntry {
    pub month: String,
    pub score: f64,
    pub tier: ScoreTier,
    pub breakdown: ScoreBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_from_previous: Option<f64>,
}

/// Progress snapshot for the current, still-running month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthProgress {
    pub month: String,
    pub current_score: f64,
    pub tier: ScoreTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<ScoreTier>,
    /// 0-100 percent toward the next tier; always 100 at tier 3.
    pub progress_to_next_tier: f64,
    pub missing_requirements: Vec<String>,
    pub days_remaining: u32,
}
