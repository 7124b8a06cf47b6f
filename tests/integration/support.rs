//! Shared mock collaborators for the integration suites.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use mindbeat_engine::error::{EngineError, EngineResult};
use mindbeat_engine::models::metrics::{ActivityLogEntry, ActivityType, QualityMetric};
use mindbeat_engine::models::sources::{
    ActivityLogProvider, DataSources, FocusStatistics, GoalRecord, GoalsProvider,
    HabitCompletionRecord, HabitRecord, HabitsProvider, JournalPeriodStats, JournalProvider,
    MoodEntryRecord, MoodProvider, QualityMetricsProvider, StatisticsProvider,
};
use mindbeat_engine::{EngineConfig, ScoreEngine};

/// Data the mock collaborators serve, regardless of the requested range
/// (activity logs and quality samples are generated relative to the range
/// start, so every month looks the same).
#[derive(Clone, Default)]
pub struct MockData {
    pub focus: FocusStatistics,
    pub goals: Vec<GoalRecord>,
    pub habits: Vec<HabitRecord>,
    pub completions: Vec<HabitCompletionRecord>,
    pub mood_count: u32,
    pub journal: JournalPeriodStats,
    /// (day of month, activity type) pairs turned into log entries.
    pub log_days: Vec<(u32, ActivityType)>,
    pub quality: Vec<(ActivityType, f64)>,
}

pub struct MockSources {
    pub data: Mutex<MockData>,
    pub fail_statistics: AtomicBool,
    pub fail_goals: AtomicBool,
    pub fail_habits: AtomicBool,
    pub fail_mood: AtomicBool,
    pub fail_journal: AtomicBool,
    pub fail_activity_log: AtomicBool,
    pub fail_quality: AtomicBool,
    pub statistics_calls: AtomicUsize,
    pub activity_log_calls: AtomicUsize,
}

impl MockSources {
    pub fn new(data: MockData) -> Arc<Self> {
        Arc::new(Self {
            data: Mutex::new(data),
            fail_statistics: AtomicBool::new(false),
            fail_goals: AtomicBool::new(false),
            fail_habits: AtomicBool::new(false),
            fail_mood: AtomicBool::new(false),
            fail_journal: AtomicBool::new(false),
            fail_activity_log: AtomicBool::new(false),
            fail_quality: AtomicBool::new(false),
            statistics_calls: AtomicUsize::new(0),
            activity_log_calls: AtomicUsize::new(0),
        })
    }

    pub fn fail_everything(&self) {
        for flag in [
            &self.fail_statistics,
            &self.fail_goals,
            &self.fail_habits,
            &self.fail_mood,
            &self.fail_journal,
            &self.fail_activity_log,
            &self.fail_quality,
        ] {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn set_data(&self, data: MockData) {
        *self.data.lock().unwrap() = data;
    }

    fn snapshot(&self) -> MockData {
        self.data.lock().unwrap().clone()
    }
}

fn timestamp_on(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).expect("valid time"))
}

#[async_trait::async_trait]
impl StatisticsProvider for MockSources {
    async fn get_statistics(
        &self,
        _start_date: &str,
        _end_date: &str,
    ) -> EngineResult<FocusStatistics> {
        self.statistics_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_statistics.load(Ordering::SeqCst) {
            return Err(EngineError::data_source("statistics", "statistics backend offline"));
        }
        Ok(self.snapshot().focus)
    }
}

#[async_trait::async_trait]
impl GoalsProvider for MockSources {
    async fn get_goals_history(
        &self,
        _start_date: &str,
        _end_date: &str,
    ) -> EngineResult<Vec<GoalRecord>> {
        if self.fail_goals.load(Ordering::SeqCst) {
            return Err(EngineError::data_source("goals", "goals backend offline"));
        }
        Ok(self.snapshot().goals)
    }
}

#[async_trait::async_trait]
impl HabitsProvider for MockSources {
    async fn get_habits(&self) -> EngineResult<Vec<HabitRecord>> {
        if self.fail_habits.load(Ordering::SeqCst) {
            return Err(EngineError::data_source("habits", "habits backend offline"));
        }
        Ok(self.snapshot().habits)
    }

    async fn get_habit_completions(
        &self,
        _start_date: &str,
        _end_date: &str,
    ) -> EngineResult<Vec<HabitCompletionRecord>> {
        if self.fail_habits.load(Ordering::SeqCst) {
            return Err(EngineError::data_source("habits", "habits backend offline"));
        }
        Ok(self.snapshot().completions)
    }
}

#[async_trait::async_trait]
impl MoodProvider for MockSources {
    async fn get_mood_entries(
        &self,
        _start_date: &str,
        _end_date: &str,
    ) -> EngineResult<Vec<MoodEntryRecord>> {
        if self.fail_mood.load(Ordering::SeqCst) {
            return Err(EngineError::data_source("mood", "mood backend offline"));
        }
        let count = self.snapshot().mood_count;
        Ok((0..count)
            .map(|_| MoodEntryRecord {
                mood: "content".into(),
                timestamp: Utc::now(),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl JournalProvider for MockSources {
    async fn get_stats_for_period(
        &self,
        _start_date: &str,
        _end_date: &str,
    ) -> EngineResult<JournalPeriodStats> {
        if self.fail_journal.load(Ordering::SeqCst) {
            return Err(EngineError::data_source("journal", "journal backend offline"));
        }
        Ok(self.snapshot().journal)
    }
}

#[async_trait::async_trait]
impl ActivityLogProvider for MockSources {
    async fn get_activity_logs(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Vec<ActivityLogEntry>> {
        self.activity_log_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_activity_log.load(Ordering::SeqCst) {
            return Err(EngineError::data_source("activity_log", "activity log backend offline"));
        }
        let logs = self
            .snapshot()
            .log_days
            .iter()
            .filter_map(|(day, activity_type)| {
                let date = start_date.with_day(*day)?;
                if date > end_date {
                    return None;
                }
                Some(ActivityLogEntry {
                    activity_type: *activity_type,
                    action: "completed".into(),
                    timestamp: timestamp_on(date),
                    quality: None,
                    duration_minutes: None,
                })
            })
            .collect();
        Ok(logs)
    }
}

#[async_trait::async_trait]
impl QualityMetricsProvider for MockSources {
    async fn get_quality_metrics(
        &self,
        start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> EngineResult<Vec<QualityMetric>> {
        if self.fail_quality.load(Ordering::SeqCst) {
            return Err(EngineError::data_source(
                "quality_metrics",
                "quality metrics backend offline",
            ));
        }
        Ok(self
            .snapshot()
            .quality
            .iter()
            .map(|(activity_type, score)| QualityMetric {
                activity_type: *activity_type,
                quality_score: *score,
                timestamp: timestamp_on(start_date),
            })
            .collect())
    }
}

pub fn sources_for(mock: &Arc<MockSources>) -> DataSources {
    DataSources {
        statistics: mock.clone(),
        goals: mock.clone(),
        habits: mock.clone(),
        mood: mock.clone(),
        journal: mock.clone(),
        activity_log: mock.clone(),
        quality_metrics: mock.clone(),
    }
}

pub fn engine_for(mock: &Arc<MockSources>) -> ScoreEngine {
    ScoreEngine::new(sources_for(mock), EngineConfig::default())
}

fn habit_records(count: u32) -> Vec<HabitRecord> {
    (0..count)
        .map(|i| HabitRecord {
            id: format!("habit-{i}"),
            name: format!("Habit {i}"),
        })
        .collect()
}

fn completion_records(completed: u32, skipped: u32) -> Vec<HabitCompletionRecord> {
    (0..completed + skipped)
        .map(|i| HabitCompletionRecord {
            habit_id: format!("habit-{}", i % 5),
            date: "2025-09-01".into(),
            completed: i < completed,
        })
        .collect()
}

/// The documented scoring scenario: 20 active days in a 30-day month,
/// 5 pomodoro sessions, 6h focus, 3 journal entries, no moods, 3 of 5
/// habits completed, no meditation, no quality data. Scores 45, tier 1.
pub fn scenario_data() -> MockData {
    MockData {
        focus: FocusStatistics {
            focus_time: 6.0,
            sessions: 5,
            tasks_done: 12,
        },
        goals: vec![GoalRecord {
            id: "goal-1".into(),
            title: "Ship the quarterly report".into(),
            completed: false,
        }],
        habits: habit_records(5),
        completions: completion_records(3, 2),
        mood_count: 0,
        journal: JournalPeriodStats {
            total_entries: 3,
            gratitude_entries: 1,
            collections: 0,
        },
        log_days: (1..=20).map(|day| (day, ActivityType::Habit)).collect(),
        quality: Vec::new(),
    }
}

/// A fully engaged month that lands in tier 3 for any month length.
pub fn rich_data() -> MockData {
    let mut log_days: Vec<(u32, ActivityType)> =
        (1..=28).map(|day| (day, ActivityType::Habit)).collect();
    log_days.extend((1..=18).map(|day| (day, ActivityType::Meditation)));

    MockData {
        focus: FocusStatistics {
            focus_time: 20.0,
            sessions: 40,
            tasks_done: 60,
        },
        goals: vec![
            GoalRecord {
                id: "goal-1".into(),
                title: "Morning routine".into(),
                completed: true,
            },
            GoalRecord {
                id: "goal-2".into(),
                title: "Read two books".into(),
                completed: true,
            },
        ],
        habits: habit_records(5),
        completions: completion_records(5, 0),
        mood_count: 12,
        journal: JournalPeriodStats {
            total_entries: 25,
            gratitude_entries: 10,
            collections: 2,
        },
        log_days,
        quality: vec![(ActivityType::Habit, 9.0), (ActivityType::Goal, 9.0)],
    }
}
