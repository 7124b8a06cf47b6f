//! End-to-end tests for the single-month scoring pipeline:
//! aggregation, calculation, validation and caching.

mod support;

use std::sync::atomic::Ordering;

use futures::future::join_all;
use mindbeat_engine::{EngineError, ScoreTier};
use support::{engine_for, rich_data, scenario_data, MockData, MockSources};

const MONTH: &str = "2025-09";

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_produces_the_documented_scenario() {
    let mock = MockSources::new(scenario_data());
    let engine = engine_for(&mock);

    let score = engine
        .calculate_monthly_score(MONTH, Some("user-1"), false)
        .await
        .expect("pipeline should succeed");

    assert_eq!(score.score, 45.0);
    assert_eq!(score.tier, ScoreTier::Tier1);
    assert_eq!(score.breakdown.base_engagement, 40.0);
    assert_eq!(score.breakdown.quality_multipliers, 0.0);
    assert_eq!(score.breakdown.consistency_bonuses, 5.0);
    assert_eq!(score.breakdown.excellence_bonuses, 0.0);
    assert_eq!(score.month, MONTH);
    assert_eq!(score.user_id.as_deref(), Some("user-1"));
    assert_eq!(score.requirements.active_days, 20);
    assert!((score.requirements.habit_completion_rate - 0.6).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_call_is_served_from_cache() {
    let mock = MockSources::new(scenario_data());
    let engine = engine_for(&mock);

    let first = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();
    let second = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        mock.statistics_calls.load(Ordering::SeqCst),
        1,
        "second call must not reach the collaborators"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn force_recalculate_re_derives_from_current_data() {
    let mock = MockSources::new(scenario_data());
    let engine = engine_for(&mock);

    let before = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();
    assert_eq!(before.score, 45.0);

    // Underlying data changes: focus time drops below the 5h threshold.
    let mut changed = scenario_data();
    changed.focus.focus_time = 0.0;
    changed.focus.sessions = 0;
    mock.set_data(changed);

    // A plain call still serves the stale cached score.
    let cached = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();
    assert_eq!(cached.score, 45.0);

    let forced = engine
        .calculate_monthly_score(MONTH, None, true)
        .await
        .unwrap();
    // Base engagement loses the pomodoro and focus-time points.
    assert_eq!(forced.score, 30.0);
    assert_eq!(mock.statistics_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn one_failing_source_degrades_only_its_own_fields() {
    let mock = MockSources::new(scenario_data());
    mock.fail_statistics.store(true, Ordering::SeqCst);
    let engine = engine_for(&mock);

    let score = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .expect("one failed source must not abort the pipeline");

    // Focus and pomodoro points are gone, everything else is intact.
    assert_eq!(score.breakdown.base_engagement, 25.0);
    assert_eq!(score.breakdown.consistency_bonuses, 5.0);
    assert_eq!(score.score, 30.0);
    assert_eq!(score.requirements.total_focus_time, 0.0);
    assert_eq!(score.requirements.active_days, 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn all_sources_failing_still_returns_a_zero_score() {
    let mock = MockSources::new(scenario_data());
    mock.fail_everything();
    let engine = engine_for(&mock);

    let score = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .expect("aggregation is best-effort even when every source fails");

    assert_eq!(score.score, 0.0);
    assert_eq!(score.tier, ScoreTier::Tier1);
}

#[tokio::test(flavor = "multi_thread")]
async fn quality_samples_add_their_own_component() {
    let mut data = scenario_data();
    // Habit avg 9 adjusts to 8; a single group makes the weighted mean 8.
    data.quality = vec![(mindbeat_engine::ActivityType::Habit, 9.0)];
    let mock = MockSources::new(data);
    let engine = engine_for(&mock);

    let score = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();

    assert_eq!(score.breakdown.quality_multipliers, 8.0);
    assert_eq!(score.score, 53.0);
    assert_eq!(score.tier, ScoreTier::Tier2);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_quality_source_scores_without_quality_data() {
    let mut data = scenario_data();
    data.quality = vec![(mindbeat_engine::ActivityType::Habit, 9.0)];
    let mock = MockSources::new(data);
    mock.fail_quality.store(true, Ordering::SeqCst);
    let engine = engine_for(&mock);

    let score = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();
    assert_eq!(score.breakdown.quality_multipliers, 0.0);
    assert_eq!(score.score, 45.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_invalidates_and_recomputes() {
    let mock = MockSources::new(scenario_data());
    let engine = engine_for(&mock);

    engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();

    mock.set_data(rich_data());
    engine.refresh_monthly_data(MONTH, None).await.unwrap();

    let refreshed = engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();
    assert_eq!(refreshed.tier, ScoreTier::Tier3);
    assert!(refreshed.score > 45.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_cache_drops_every_cached_month() {
    let mock = MockSources::new(scenario_data());
    let engine = engine_for(&mock);

    engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();
    engine
        .calculate_monthly_score("2025-08", None, false)
        .await
        .unwrap();
    assert_eq!(mock.statistics_calls.load(Ordering::SeqCst), 2);

    engine.clear_cache();

    engine
        .calculate_monthly_score(MONTH, None, false)
        .await
        .unwrap();
    assert_eq!(mock.statistics_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_month_ids_are_rejected_up_front() {
    let mock = MockSources::new(scenario_data());
    let engine = engine_for(&mock);

    for bad in ["2025-9", "2025/09", "september", ""] {
        let result = engine.calculate_monthly_score(bad, None, false).await;
        assert!(
            matches!(result, Err(EngineError::InvalidMonthId(_))),
            "{bad:?} should be rejected"
        );
    }
    assert_eq!(
        mock.statistics_calls.load(Ordering::SeqCst),
        0,
        "rejected requests must not reach the collaborators"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn per_user_scores_are_cached_independently() {
    let mock = MockSources::new(scenario_data());
    let engine = engine_for(&mock);

    let a = engine
        .calculate_monthly_score(MONTH, Some("user-a"), false)
        .await
        .unwrap();
    let b = engine
        .calculate_monthly_score(MONTH, Some("user-b"), false)
        .await
        .unwrap();

    assert_eq!(a.score, b.score);
    assert_eq!(
        mock.statistics_calls.load(Ordering::SeqCst),
        2,
        "distinct users must not share cache slots"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_duplicate_requests_all_resolve() {
    let mock = MockSources::new(scenario_data());
    let engine = engine_for(&mock);

    let calls = (0..4).map(|_| engine.calculate_monthly_score(MONTH, None, false));
    let results: Vec<_> = join_all(calls).await;

    let scores: Vec<_> = results
        .into_iter()
        .map(|r| r.expect("duplicate in-flight requests are acceptable"))
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test(flavor = "multi_thread")]
async fn gathered_metrics_are_written_to_the_cache_as_a_side_effect() {
    use std::sync::Arc;

    use mindbeat_engine::{CacheKey, EngineCache, EngineConfig, InMemoryCache, ScoreEngine};

    let mock = MockSources::new(MockData::default());
    let cache: Arc<InMemoryCache> = Arc::new(InMemoryCache::new(8));
    let engine = ScoreEngine::with_cache(
        support::sources_for(&mock),
        cache.clone(),
        EngineConfig::default(),
    );

    let metrics = engine.gather_monthly_metrics(MONTH, None).await.unwrap();
    assert_eq!(metrics.active_days, 0);
    assert_eq!(metrics.total_habits, 0);
    assert_eq!(metrics.month, MONTH);

    let cached = cache
        .get_metrics(&CacheKey::new(MONTH, None))
        .expect("aggregation must populate the metrics cache");
    assert_eq!(cached, metrics);
}
