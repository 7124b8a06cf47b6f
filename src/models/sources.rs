//! Typed contracts for the collaborator services the engine reads from.
//!
//! Every consumed response shape is an explicit struct validated at the
//! boundary; every collaborator is an async trait so callers can inject
//! real services or test doubles. Date-range parameters are ISO
//! `YYYY-MM-DD` strings, except the activity-log and quality-metric calls
//! which take native dates.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::metrics::{ActivityLogEntry, QualityMetric};

/// Focus statistics for a period. `focus_time` is in hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusStatistics {
    pub focus_time: f64,
    pub sessions: u32,
    pub tasks_done: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecord {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletionRecord {
    pub habit_id: String,
    pub date: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntryRecord {
    pub mood: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Journal statistics for a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalPeriodStats {
    pub total_entries: u32,
    pub gratitude_entries: u32,
    pub collections: u32,
}

#[async_trait::async_trait]
pub trait StatisticsProvider: Send + Sync {
    async fn get_statistics(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> EngineResult<FocusStatistics>;
}

#[async_trait::async_trait]
pub trait GoalsProvider: Send + Sync {
    async fn get_goals_history(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> EngineResult<Vec<GoalRecord>>;
}

#[async_trait::async_trait]
pub trait HabitsProvider: Send + Sync {
    async fn get_habits(&self) -> EngineResult<Vec<HabitRecord>>;

    async fn get_habit_completions(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> EngineResult<Vec<HabitCompletionRecord>>;
}

#[async_trait::async_trait]
pub trait MoodProvider: Send + Sync {
    async fn get_mood_entries(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> EngineResult<Vec<MoodEntryRecord>>;
}

#[async_trait::async_trait]
pub trait JournalProvider: Send + Sync {
    async fn get_stats_for_period(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> EngineResult<JournalPeriodStats>;
}

#[async_trait::async_trait]
pub trait ActivityLogProvider: Send + Sync {
    async fn get_activity_logs(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Vec<ActivityLogEntry>>;
}

#[async_trait::async_trait]
pub trait QualityMetricsProvider: Send + Sync {
    async fn get_quality_metrics(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Vec<QualityMetric>>;
}

/// Bundle of collaborator handles wired once at application start and
/// passed to the engine by dependency injection.
#[derive(Clone)]
pub struct DataSources {
    pub statistics: Arc<dyn StatisticsProvider>,
    pub goals: Arc<dyn GoalsProvider>,
    pub habits: Arc<dyn HabitsProvider>,
    pub mood: Arc<dyn MoodProvider>,
    pub journal: Arc<dyn JournalProvider>,
    pub activity_log: Arc<dyn ActivityLogProvider>,
    pub quality_metrics: Arc<dyn QualityMetricsProvider>,
}
