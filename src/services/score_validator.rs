use tracing::warn;

use crate::models::metrics::MonthlyMetrics;
use crate::models::score::{
    MonthlyScore, ScoreTier, MAX_BASE_ENGAGEMENT, MAX_CONSISTENCY_BONUSES, MAX_EXCELLENCE_BONUSES,
    MAX_QUALITY_MULTIPLIERS,
};
use crate::utils::month::MONTH_ID_PATTERN;

const BREAKDOWN_SUM_EPSILON: f64 = 0.01;
const FOCUS_TIME_EPSILON: f64 = 0.1;
const HABIT_RATE_EPSILON: f64 = 0.01;

/// Collected outcome of one validation pass. Errors are fatal for the
/// request; warnings are advisory and never block.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Internal and cross-record consistency checks for computed scores.
#[derive(Debug, Clone)]
pub struct ScoreValidator {
    min_year: i32,
    max_year: i32,
}

impl Default for ScoreValidator {
    fn default() -> Self {
        Self::new(2020, 2030)
    }
}

impl ScoreValidator {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self { min_year, max_year }
    }

    /// Metrics-only check run by the aggregator before a record leaves it.
    pub fn validate_metrics(&self, metrics: &MonthlyMetrics) -> ValidationReport {
        let mut report = ValidationReport::default();

        if metrics.active_days > 31 {
            report.error(format!(
                "activeDays {} exceeds the maximum calendar month length",
                metrics.active_days
            ));
        }
        if metrics.habit_completions > metrics.total_habits {
            report.error(format!(
                "habitCompletions {} exceeds totalHabits {}",
                metrics.habit_completions, metrics.total_habits
            ));
        }
        if metrics.total_focus_time < 0.0 || !metrics.total_focus_time.is_finite() {
            report.error(format!(
                "totalFocusTime {} is not a non-negative number",
                metrics.total_focus_time
            ));
        }

        if metrics.pomodoro_sessions > 0 && metrics.active_days == 0 {
            report.warning(format!(
                "{} pomodoro sessions recorded without a single active day",
                metrics.pomodoro_sessions
            ));
        }

        self.log_warnings(&metrics.month, &report);
        report
    }

    /// Structural check: the score must be internally coherent.
    pub fn validate_monthly_score(&self, score: &MonthlyScore) -> ValidationReport {
        let mut report = ValidationReport::default();

        if !(0.0..=100.0).contains(&score.score) || !score.score.is_finite() {
            report.error(format!("score {} is outside 0-100", score.score));
        }

        self.check_month_id(&score.month, &mut report);

        let sum = score.breakdown.total();
        if (sum - score.score).abs() > BREAKDOWN_SUM_EPSILON {
            report.error(format!(
                "breakdown sum {:.4} does not match score {:.2}",
                sum, score.score
            ));
        }

        for (name, value, cap) in [
            (
                "baseEngagement",
                score.breakdown.base_engagement,
                MAX_BASE_ENGAGEMENT,
            ),
            (
                "qualityMultipliers",
                score.breakdown.quality_multipliers,
                MAX_QUALITY_MULTIPLIERS,
            ),
            (
                "consistencyBonuses",
                score.breakdown.consistency_bonuses,
                MAX_CONSISTENCY_BONUSES,
            ),
            (
                "excellenceBonuses",
                score.breakdown.excellence_bonuses,
                MAX_EXCELLENCE_BONUSES,
            ),
        ] {
            if value < 0.0 {
                report.error(format!("{name} {value} is negative"));
            } else if value > cap {
                report.warning(format!("{name} {value} exceeds its cap of {cap}"));
            }
        }

        let implied = ScoreTier::from_score(score.score);
        if score.tier != implied {
            report.error(format!(
                "tier {} does not match score {} (expected {})",
                score.tier.as_str(),
                score.score,
                implied.as_str()
            ));
        }

        self.log_warnings(&score.month, &report);
        report
    }

    /// Cross-consistency: the requirements snapshot must match the metrics
    /// the score was derived from.
    pub fn validate_score_consistency(
        &self,
        score: &MonthlyScore,
        metrics: &MonthlyMetrics,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();
        let req = &score.requirements;

        if req.active_days != metrics.active_days {
            report.error(format!(
                "requirements activeDays {} does not match metrics {}",
                req.active_days, metrics.active_days
            ));
        }
        if req.meditation_sessions != metrics.meditation_sessions {
            report.error(format!(
                "requirements meditationSessions {} does not match metrics {}",
                req.meditation_sessions, metrics.meditation_sessions
            ));
        }
        if req.journal_entries != metrics.journal_entries {
            report.error(format!(
                "requirements journalEntries {} does not match metrics {}",
                req.journal_entries, metrics.journal_entries
            ));
        }
        if req.completed_goals != metrics.completed_goals {
            report.error(format!(
                "requirements completedGoals {} does not match metrics {}",
                req.completed_goals, metrics.completed_goals
            ));
        }
        if (req.total_focus_time - metrics.total_focus_time).abs() > FOCUS_TIME_EPSILON {
            report.error(format!(
                "requirements totalFocusTime {} does not match metrics {}",
                req.total_focus_time, metrics.total_focus_time
            ));
        }
        if (req.habit_completion_rate - metrics.habit_completion_rate()).abs() > HABIT_RATE_EPSILON
        {
            report.error(format!(
                "requirements habitCompletionRate {:.4} does not match metrics {:.4}",
                req.habit_completion_rate,
                metrics.habit_completion_rate()
            ));
        }

        // Statistically suspicious combinations are worth a look but not
        // a rejection.
        if score.score > 90.0 && metrics.active_days < 20 {
            report.warning(format!(
                "score {} above 90 with only {} active days",
                score.score, metrics.active_days
            ));
        }
        if score.score >= 80.0 && metrics.total_focus_time <= 0.0 {
            report.warning(format!(
                "score {} at tier 3 with zero tracked focus time",
                score.score
            ));
        }

        self.log_warnings(&score.month, &report);
        report
    }

    fn check_month_id(&self, month_id: &str, report: &mut ValidationReport) {
        if !MONTH_ID_PATTERN.is_match(month_id) {
            report.error(format!("month '{month_id}' is not in YYYY-MM format"));
            return;
        }

        let (year_part, month_part) = month_id.split_at(4);
        let year: i32 = year_part.parse().unwrap_or(0);
        let month: u32 = month_part[1..].parse().unwrap_or(0);

        if year < self.min_year || year > self.max_year {
            report.error(format!(
                "month year {} is outside the accepted range {}-{}",
                year, self.min_year, self.max_year
            ));
        }
        if !(1..=12).contains(&month) {
            report.error(format!("month number {month} is outside 1-12"));
        }
    }

    fn log_warnings(&self, month: &str, report: &ValidationReport) {
        for warning in &report.warnings {
            warn!(target: "engine::validation", %month, %warning, "validation warning");
        }
    }
}
