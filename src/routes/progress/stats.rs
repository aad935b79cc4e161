//! Trend and score computation for the progress summary. Pure functions over
//! already-fetched rows; nothing here touches the database.

use chrono::{DateTime, Duration, Utc};

use crate::routes::sessions::SessionDetail;

/// Endpoint-to-endpoint percentage change of a metric over a lookback window.
///
/// Entries outside the window or without a value are dropped; the survivors
/// are ordered by date and the first/last pair bounds the trend. Fewer than
/// two qualifying points (or a zero first value) yields exactly 0.
pub fn window_trend(
    series: &[(DateTime<Utc>, Option<f64>)],
    now: DateTime<Utc>,
    window_days: i64,
) -> f64 {
    let cutoff = now - Duration::days(window_days);

    let mut points: Vec<(DateTime<Utc>, f64)> = series
        .iter()
        .filter_map(|(at, value)| value.map(|v| (*at, v)))
        .filter(|(at, _)| *at >= cutoff)
        .collect();

    if points.len() < 2 {
        return 0.0;
    }

    points.sort_by_key(|(at, _)| *at);

    let first = points.first().map(|(_, v)| *v).unwrap_or(0.0);
    let last = points.last().map(|(_, v)| *v).unwrap_or(0.0);

    if first == 0.0 {
        return 0.0;
    }

    (last - first) / first * 100.0
}

/// Session frequency over the last 30 days against a 3-per-week baseline,
/// normalized to 4 weeks and clamped to 100.
pub fn consistency_score(sessions_last_30_days: i64) -> f64 {
    ((sessions_last_30_days as f64 / 4.0) * (100.0 / 3.0)).min(100.0)
}

/// Composite improvement heuristic, clamped to [0, 100].
///
/// Starts from a neutral 50. A falling weight trend adds 5 points per percent
/// lost; a rising trend subtracts 10 per percent gained (deliberately
/// loss-biased). Strength progress contributes its raw percent change, and
/// recent sessions add up to 20 points of recency bonus.
pub fn improvement_score(
    weight_trend_30d: f64,
    strength_progress_pct: f64,
    sessions_last_30_days: i64,
) -> f64 {
    let weight_term = if weight_trend_30d < 0.0 {
        -weight_trend_30d * 5.0
    } else {
        -(weight_trend_30d * 10.0)
    };

    let recency_bonus = (sessions_last_30_days as f64 * 2.5).min(20.0);

    (50.0 + weight_term + strength_progress_pct + recency_bonus).clamp(0.0, 100.0)
}

/// Percent change in total weight lifted between the oldest-5 and newest-5
/// subsets of the recent sessions (totals are newest first). Zero when fewer
/// than 6 sessions exist or the older subset lifted nothing.
pub fn strength_progress(session_totals_newest_first: &[f64]) -> f64 {
    let n = session_totals_newest_first.len();
    if n < 6 {
        return 0.0;
    }

    let newest: f64 = session_totals_newest_first[..5].iter().sum();
    let oldest: f64 = session_totals_newest_first[n - 5..].iter().sum();

    if oldest == 0.0 {
        return 0.0;
    }

    (newest - oldest) / oldest * 100.0
}

/// Completed sets over total sets as a rounded percentage; 0 when no sets.
pub fn completion_rate(completed_sets: i64, total_sets: i64) -> i32 {
    if total_sets == 0 {
        return 0;
    }
    ((completed_sets as f64 / total_sets as f64) * 100.0).round() as i32
}

/// Mean session duration in whole minutes; 0 when no sessions.
pub fn average_duration_minutes(total_duration_secs: i64, session_count: usize) -> i64 {
    if session_count == 0 {
        return 0;
    }
    ((total_duration_secs as f64 / session_count as f64) / 60.0).round() as i64
}

/// Accumulated set-walk over the recent sessions.
#[derive(Debug, Default, PartialEq)]
pub struct SetTotals {
    pub total_sets: i64,
    pub completed_sets: i64,
    /// Sum of actual weight x actual reps for completed sets with both present.
    pub total_weight_lifted: f64,
    /// Sum of actual reps for the same completed sets.
    pub total_reps: i64,
    pub total_duration_secs: i64,
}

pub fn walk_sets(sessions: &[SessionDetail]) -> SetTotals {
    let mut totals = SetTotals::default();

    for session in sessions {
        totals.total_duration_secs += i64::from(session.session.duration_secs);
        for exercise in &session.exercises {
            for set in &exercise.sets {
                totals.total_sets += 1;
                if set.completed {
                    totals.completed_sets += 1;
                    if let (Some(weight), Some(reps)) = (set.actual_weight, set.actual_reps) {
                        totals.total_weight_lifted += weight * f64::from(reps);
                        totals.total_reps += i64::from(reps);
                    }
                }
            }
        }
    }

    totals
}

/// Per-session total weight lifted (completed sets only), preserving the
/// newest-first order of the input.
pub fn session_weight_totals(sessions: &[SessionDetail]) -> Vec<f64> {
    sessions
        .iter()
        .map(|session| {
            session
                .exercises
                .iter()
                .flat_map(|exercise| &exercise.sets)
                .filter(|set| set.completed)
                .filter_map(|set| {
                    match (set.actual_weight, set.actual_reps) {
                        (Some(weight), Some(reps)) => Some(weight * f64::from(reps)),
                        _ => None,
                    }
                })
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::sessions::{
        SessionDetail, SessionExercise, SessionExerciseDetail, SessionSet, WorkoutSession,
    };
    use uuid::Uuid;

    fn days_ago(n: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(n)
    }

    fn set(completed: bool, weight: Option<f64>, reps: Option<i32>) -> SessionSet {
        SessionSet {
            id: Uuid::new_v4(),
            session_exercise_id: Uuid::new_v4(),
            set_number: 1,
            target_reps: reps.unwrap_or(0),
            target_weight: weight,
            actual_reps: reps,
            actual_weight: weight,
            completed,
        }
    }

    fn session(duration_secs: i32, sets: Vec<SessionSet>) -> SessionDetail {
        let session_id = Uuid::new_v4();
        SessionDetail {
            session: WorkoutSession {
                id: session_id,
                user_id: Uuid::new_v4(),
                workout_id: None,
                workout_name: "Push day".to_string(),
                started_at: Utc::now(),
                ended_at: Utc::now(),
                duration_secs,
                created_at: Utc::now(),
            },
            exercises: vec![SessionExerciseDetail {
                exercise: SessionExercise {
                    id: Uuid::new_v4(),
                    session_id,
                    exercise_id: Uuid::new_v4(),
                    exercise_name: "Bench press".to_string(),
                    position: 0,
                },
                sets,
            }],
        }
    }

    #[test]
    fn trend_matches_worked_example() {
        // [{d0, 80}, {d0-10, 82}] within 30 days -> (80-82)/82*100
        let series = vec![(days_ago(0), Some(80.0)), (days_ago(10), Some(82.0))];
        let trend = window_trend(&series, Utc::now(), 30);
        assert!((trend - (-2.4390243902439024)).abs() < 1e-9);
    }

    #[test]
    fn trend_is_zero_with_fewer_than_two_points() {
        assert_eq!(window_trend(&[], Utc::now(), 30), 0.0);
        assert_eq!(
            window_trend(&[(days_ago(1), Some(80.0))], Utc::now(), 30),
            0.0
        );
    }

    #[test]
    fn trend_ignores_null_values_and_out_of_window_points() {
        let series = vec![
            (days_ago(0), Some(80.0)),
            (days_ago(5), None),
            (days_ago(45), Some(90.0)),
        ];
        // Only one qualifying point remains in the 30-day window.
        assert_eq!(window_trend(&series, Utc::now(), 30), 0.0);
    }

    #[test]
    fn trend_zero_when_first_point_is_zero() {
        let series = vec![(days_ago(10), Some(0.0)), (days_ago(0), Some(5.0))];
        assert_eq!(window_trend(&series, Utc::now(), 30), 0.0);
    }

    #[test]
    fn consistency_twelve_sessions_is_exactly_100() {
        assert_eq!(consistency_score(12), 100.0);
    }

    #[test]
    fn consistency_is_clamped_and_zero_based() {
        assert_eq!(consistency_score(0), 0.0);
        assert_eq!(consistency_score(500), 100.0);
        assert!((consistency_score(6) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn improvement_neutral_baseline_is_50() {
        assert_eq!(improvement_score(0.0, 0.0, 0), 50.0);
    }

    #[test]
    fn improvement_is_loss_biased() {
        // 2% lost adds 10; 2% gained subtracts 20.
        assert_eq!(improvement_score(-2.0, 0.0, 0), 60.0);
        assert_eq!(improvement_score(2.0, 0.0, 0), 30.0);
    }

    #[test]
    fn improvement_clamps_both_ends() {
        assert_eq!(improvement_score(20.0, 0.0, 0), 0.0);
        assert_eq!(improvement_score(-20.0, 50.0, 8), 100.0);
    }

    #[test]
    fn improvement_recency_bonus_caps_at_20() {
        assert_eq!(improvement_score(0.0, 0.0, 8), 70.0);
        assert_eq!(improvement_score(0.0, 0.0, 30), 70.0);
    }

    #[test]
    fn strength_progress_needs_six_sessions() {
        assert_eq!(strength_progress(&[100.0; 5]), 0.0);
        assert_eq!(strength_progress(&[]), 0.0);
    }

    #[test]
    fn strength_progress_compares_newest_and_oldest_halves() {
        let totals = vec![
            110.0, 110.0, 110.0, 110.0, 110.0, // newest 5 -> 550
            100.0, 100.0, 100.0, 100.0, 100.0, // oldest 5 -> 500
        ];
        assert!((strength_progress(&totals) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn strength_progress_zero_when_older_subset_lifted_nothing() {
        let totals = vec![100.0, 100.0, 100.0, 100.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(strength_progress(&totals), 0.0);
    }

    #[test]
    fn completion_rate_handles_zero_sets() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(3, 4), 75);
        assert_eq!(completion_rate(2, 3), 67);
    }

    #[test]
    fn average_duration_handles_zero_sessions() {
        assert_eq!(average_duration_minutes(0, 0), 0);
        assert_eq!(average_duration_minutes(3600, 2), 30);
    }

    #[test]
    fn walk_sets_accumulates_only_complete_data() {
        let sessions = vec![session(
            1800,
            vec![
                set(true, Some(60.0), Some(10)),
                set(true, None, Some(10)),
                set(false, Some(60.0), Some(10)),
            ],
        )];

        let totals = walk_sets(&sessions);
        assert_eq!(totals.total_sets, 3);
        assert_eq!(totals.completed_sets, 2);
        assert_eq!(totals.total_weight_lifted, 600.0);
        assert_eq!(totals.total_reps, 10);
        assert_eq!(totals.total_duration_secs, 1800);
    }

    #[test]
    fn session_weight_totals_preserve_order() {
        let sessions = vec![
            session(600, vec![set(true, Some(50.0), Some(10))]),
            session(600, vec![set(true, Some(40.0), Some(10))]),
        ];
        assert_eq!(session_weight_totals(&sessions), vec![500.0, 400.0]);
    }
}
