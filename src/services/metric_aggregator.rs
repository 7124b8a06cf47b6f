use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, error, warn};

use crate::error::EngineResult;
use crate::models::analytics::{ActivityTypeCount, MonthlyAnalytics, WeekBreakdown};
use crate::models::metrics::{ActivityLogEntry, ActivityType, MonthlyMetrics, QualityMetric};
use crate::models::sources::{DataSources, FocusStatistics, JournalPeriodStats};
use crate::services::cache_service::{CacheKey, EngineCache};
use crate::services::score_validator::ScoreValidator;
use crate::utils::month;

/// Fetches and normalizes one month of raw activity data from the
/// collaborator services into a single `MonthlyMetrics` record.
///
/// Every fetch branch is individually fault tolerant: a failing source is
/// logged and replaced by its zero default, and never aborts the others.
pub struct MetricAggregator {
    sources: DataSources,
    cache: Arc<dyn EngineCache>,
    validator: ScoreValidator,
}

impl MetricAggregator {
    pub fn new(
        sources: DataSources,
        cache: Arc<dyn EngineCache>,
        validator: ScoreValidator,
    ) -> Self {
        Self {
            sources,
            cache,
            validator,
        }
    }

    /// Gather and normalize the month's metrics. Always returns a complete
    /// (if partially zeroed) record; only a malformed month id fails.
    pub async fn gather_monthly_metrics(
        &self,
        month_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<MonthlyMetrics> {
        let (start, end) = month::month_date_range(month_id)?;
        let start_iso = start.format("%Y-%m-%d").to_string();
        let end_iso = end.format("%Y-%m-%d").to_string();

        let statistics = async {
            self.sources
                .statistics
                .get_statistics(&start_iso, &end_iso)
                .await
                .unwrap_or_else(|err| {
                    warn!(target: "engine::sources", month = month_id, source = "statistics", error = %err, "fetch failed, using zero defaults");
                    FocusStatistics::default()
                })
        };

        let goals = async {
            self.sources
                .goals
                .get_goals_history(&start_iso, &end_iso)
                .await
                .unwrap_or_else(|err| {
                    warn!(target: "engine::sources", month = month_id, source = "goals", error = %err, "fetch failed, using zero defaults");
                    Vec::new()
                })
        };

        let habits = async {
            let (habits, completions) = tokio::join!(
                self.sources.habits.get_habits(),
                self.sources
                    .habits
                    .get_habit_completions(&start_iso, &end_iso),
            );
            let habits = habits.unwrap_or_else(|err| {
                warn!(target: "engine::sources", month = month_id, source = "habits", error = %err, "fetch failed, using zero defaults");
                Vec::new()
            });
            let completions = completions.unwrap_or_else(|err| {
                warn!(target: "engine::sources", month = month_id, source = "habit_completions", error = %err, "fetch failed, using zero defaults");
                Vec::new()
            });
            (habits, completions)
        };

        let mood = async {
            self.sources
                .mood
                .get_mood_entries(&start_iso, &end_iso)
                .await
                .unwrap_or_else(|err| {
                    warn!(target: "engine::sources", month = month_id, source = "mood", error = %err, "fetch failed, using zero defaults");
                    Vec::new()
                })
        };

        let journal = async {
            self.sources
                .journal
                .get_stats_for_period(&start_iso, &end_iso)
                .await
                .unwrap_or_else(|err| {
                    warn!(target: "engine::sources", month = month_id, source = "journal", error = %err, "fetch failed, using zero defaults");
                    JournalPeriodStats::default()
                })
        };

        let activity_logs = async {
            self.sources
                .activity_log
                .get_activity_logs(start, end)
                .await
                .unwrap_or_else(|err| {
                    warn!(target: "engine::sources", month = month_id, source = "activity_log", error = %err, "fetch failed, using zero defaults");
                    Vec::new()
                })
        };

        // Fan-out/fan-in: a failed branch resolves to its default above and
        // never cancels its siblings.
        let (statistics, goals, (habits, completions), mood, journal, logs) =
            tokio::join!(statistics, goals, habits, mood, journal, activity_logs);

        let metrics = MonthlyMetrics {
            month: month_id.to_string(),
            user_id: user_id.map(|id| id.to_string()),
            active_days: count_active_days(&logs, start, end),
            pomodoro_sessions: statistics.sessions,
            total_focus_time: statistics.focus_time,
            meditation_sessions: count_activity(&logs, ActivityType::Meditation, start, end),
            breathing_exercises: count_activity(&logs, ActivityType::Breathing, start, end),
            journal_entries: journal.total_entries,
            gratitude_entries: journal.gratitude_entries,
            completed_goals: goals.iter().filter(|g| g.completed).count() as u32,
            habit_completions: completions.iter().filter(|c| c.completed).count() as u32,
            total_habits: habits.len() as u32,
            mood_entries: mood.len() as u32,
        };

        // Best effort by contract: validation problems are logged, not raised.
        let report = self.validator.validate_metrics(&metrics);
        for problem in &report.errors {
            error!(target: "engine::validation", month = month_id, %problem, "metrics validation error");
        }

        debug!(
            target: "engine::sources",
            month = month_id,
            active_days = metrics.active_days,
            pomodoro_sessions = metrics.pomodoro_sessions,
            "monthly metrics gathered"
        );

        self.cache
            .put_metrics(CacheKey::new(month_id, user_id), metrics.clone());

        Ok(metrics)
    }

    /// Fetch the month's quality samples. Absence of quality data must not
    /// prevent scoring, so a failed fetch degrades to an empty list.
    pub async fn gather_quality_metrics(
        &self,
        month_id: &str,
        _user_id: Option<&str>,
    ) -> EngineResult<Vec<QualityMetric>> {
        let (start, end) = month::month_date_range(month_id)?;

        let samples = self
            .sources
            .quality_metrics
            .get_quality_metrics(start, end)
            .await
            .unwrap_or_else(|err| {
                warn!(target: "engine::sources", month = month_id, source = "quality_metrics", error = %err, "fetch failed, scoring without quality data");
                Vec::new()
            });

        Ok(samples)
    }

    /// Derive read-only analytics (counts, top types, weekly breakdown)
    /// from the month's activity logs and cache the result.
    pub async fn gather_monthly_analytics(
        &self,
        month_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<MonthlyAnalytics> {
        let (start, end) = month::month_date_range(month_id)?;

        let logs = self
            .sources
            .activity_log
            .get_activity_logs(start, end)
            .await
            .unwrap_or_else(|err| {
                warn!(target: "engine::sources", month = month_id, source = "activity_log", error = %err, "fetch failed, analytics will be empty");
                Vec::new()
            });

        let analytics = build_monthly_analytics(month_id, user_id, &logs, start, end);

        self.cache
            .put_analytics(CacheKey::new(month_id, user_id), analytics.clone());

        Ok(analytics)
    }
}

/// Distinct calendar days within the range that have at least one entry.
fn count_active_days(logs: &[ActivityLogEntry], start: NaiveDate, end: NaiveDate) -> u32 {
    logs.iter()
        .map(|entry| entry.timestamp.date_naive())
        .filter(|date| *date >= start && *date <= end)
        .collect::<HashSet<_>>()
        .len() as u32
}

/// Entries of one type within the range; out-of-range entries are ignored,
/// same as in `count_active_days`.
fn count_activity(
    logs: &[ActivityLogEntry],
    activity_type: ActivityType,
    start: NaiveDate,
    end: NaiveDate,
) -> u32 {
    logs.iter()
        .filter(|entry| entry.activity_type == activity_type)
        .map(|entry| entry.timestamp.date_naive())
        .filter(|date| *date >= start && *date <= end)
        .count() as u32
}

fn build_monthly_analytics(
    month_id: &str,
    user_id: Option<&str>,
    logs: &[ActivityLogEntry],
    start: NaiveDate,
    end: NaiveDate,
) -> MonthlyAnalytics {
    let in_month: Vec<&ActivityLogEntry> = logs
        .iter()
        .filter(|entry| {
            let date = entry.timestamp.date_naive();
            date >= start && date <= end
        })
        .collect();

    let mut counts: BTreeMap<ActivityType, u32> = BTreeMap::new();
    for entry in &in_month {
        *counts.entry(entry.activity_type).or_insert(0) += 1;
    }

    let mut ranked: Vec<ActivityTypeCount> = counts
        .into_iter()
        .map(|(activity_type, count)| ActivityTypeCount {
            activity_type,
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    let top_activity_types = ranked
        .iter()
        .take(3)
        .map(|entry| entry.activity_type)
        .collect();

    let weekly_breakdown = build_weekly_breakdown(&in_month, start, end);

    MonthlyAnalytics {
        month: month_id.to_string(),
        user_id: user_id.map(|id| id.to_string()),
        total_activities: in_month.len() as u32,
        active_days: count_active_days(logs, start, end),
        counts_by_type: ranked,
        top_activity_types,
        weekly_breakdown,
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Slice the month into consecutive 7-day windows starting on day 1; the
/// last window may be shorter.
fn build_weekly_breakdown(
    entries: &[&ActivityLogEntry],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<WeekBreakdown> {
    let days_total = end.day();
    let mut weeks = Vec::new();
    let mut week_index = 1;
    let mut first_day = 1u32;

    while first_day <= days_total {
        let last_day = (first_day + 6).min(days_total);
        let week_start = start.with_day(first_day).unwrap_or(start);
        let week_end = start.with_day(last_day).unwrap_or(end);

        let in_week: Vec<&&ActivityLogEntry> = entries
            .iter()
            .filter(|entry| {
                let day = entry.timestamp.date_naive().day();
                entry.timestamp.date_naive().month() == start.month()
                    && day >= first_day
                    && day <= last_day
            })
            .collect();

        let active_days = in_week
            .iter()
            .map(|entry| entry.timestamp.date_naive())
            .collect::<HashSet<_>>()
            .len() as u32;

        weeks.push(WeekBreakdown {
            week_index,
            start_date: week_start.format("%Y-%m-%d").to_string(),
            end_date: week_end.format("%Y-%m-%d").to_string(),
            activity_count: in_week.len() as u32,
            active_days,
        });

        week_index += 1;
        first_day = last_day + 1;
    }

    weeks
}
