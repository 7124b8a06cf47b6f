use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity categories produced by the surrounding application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Habit,
    Goal,
    Journal,
    Pomodoro,
    Meditation,
    Breathing,
    Mood,
    Other,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Habit => "habit",
            ActivityType::Goal => "goal",
            ActivityType::Journal => "journal",
            ActivityType::Pomodoro => "pomodoro",
            ActivityType::Meditation => "meditation",
            ActivityType::Breathing => "breathing",
            ActivityType::Mood => "mood",
            ActivityType::Other => "other",
        }
    }

    /// Fixed weight used when averaging quality samples across activity types.
    pub fn weight(&self) -> f64 {
        match self {
            ActivityType::Goal => 1.5,
            ActivityType::Pomodoro => 1.3,
            ActivityType::Habit => 1.2,
            ActivityType::Meditation => 1.1,
            ActivityType::Journal => 1.0,
            ActivityType::Breathing => 0.8,
            ActivityType::Mood => 0.6,
            ActivityType::Other => 0.5,
        }
    }
}

/// Normalized per-month activity totals, one record per month and user.
///
/// Produced by the aggregator, immutable afterwards; consumed by the
/// calculator and validator. Invariant: `habit_completions <= total_habits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMetrics {
    pub month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub active_days: u32,
    pub pomodoro_sessions: u32,
    /// Hours of tracked focus time.
    pub total_focus_time: f64,
    pub meditation_sessions: u32,
    pub breathing_exercises: u32,
    pub journal_entries: u32,
    pub gratitude_entries: u32,
    pub completed_goals: u32,
    pub habit_completions: u32,
    pub total_habits: u32,
    pub mood_entries: u32,
}

impl MonthlyMetrics {
    pub fn empty(month: impl Into<String>, user_id: Option<&str>) -> Self {
        Self {
            month: month.into(),
            user_id: user_id.map(|id| id.to_string()),
            active_days: 0,
            pomodoro_sessions: 0,
            total_focus_time: 0.0,
            meditation_sessions: 0,
            breathing_exercises: 0,
            journal_entries: 0,
            gratitude_entries: 0,
            completed_goals: 0,
            habit_completions: 0,
            total_habits: 0,
            mood_entries: 0,
        }
    }

    /// Habit completion rate in `[0, 1]`; zero when no habits are tracked.
    pub fn habit_completion_rate(&self) -> f64 {
        if self.total_habits == 0 {
            0.0
        } else {
            self.habit_completions as f64 / self.total_habits as f64
        }
    }
}

/// A single 1-10 quality sample for one activity instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetric {
    pub activity_type: ActivityType,
    pub quality_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Raw activity log entry, read-only input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub activity_type: ActivityType,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}
