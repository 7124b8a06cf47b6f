use serde::{Deserialize, Serialize};

use crate::models::metrics::ActivityType;

/// Activity count for one activity type within a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypeCount {
    pub activity_type: ActivityType,
    pub count: u32,
}

/// Seven-day slice of a month (the last slice may be shorter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBreakdown {
    pub week_index: u32,
    pub start_date: String,
    pub end_date: String,
    pub activity_count: u32,
    pub active_days: u32,
}

/// Derived, read-only activity analytics for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAnalytics {
    pub month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub total_activities: u32,
    pub active_days: u32,
    pub counts_by_type: Vec<ActivityTypeCount>,
    /// Up to three activity types, most frequent first.
    pub top_activity_types: Vec<ActivityType>,
    pub weekly_breakdown: Vec<WeekBreakdown>,
    pub generated_at: String,
}
