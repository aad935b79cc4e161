use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::AppError, utils::Claims};

use super::model::{CreateProgressRequest, ProgressEntry};
use super::stats;
use crate::routes::sessions::{SessionDetail, WorkoutSession};
use crate::routes::users::User;

/// Fixed aggregation windows: entries considered, sessions walked, day spans.
const PROGRESS_ENTRY_WINDOW: i64 = 30;
const RECENT_SESSION_WINDOW: i64 = 10;
const TREND_WINDOW_LONG_DAYS: i64 = 30;
const TREND_WINDOW_SHORT_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[axum::debug_handler]
pub async fn list_entries(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(90).clamp(1, 365);
    let entries = ProgressEntry::recent(&state.pool, claims.sub, limit).await?;
    Ok((StatusCode::OK, Json(entries)))
}

#[axum::debug_handler]
pub async fn create_entry(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !req.has_any_metric() {
        return Err(AppError::validation(
            "A progress entry needs at least one metric or a note",
        ));
    }
    for value in [
        req.weight_kg,
        req.body_fat_pct,
        req.chest_cm,
        req.waist_cm,
        req.hips_cm,
        req.arms_cm,
        req.thighs_cm,
    ]
    .into_iter()
    .flatten()
    {
        if value <= 0.0 {
            return Err(AppError::validation("Metric values must be positive"));
        }
    }

    User::ensure_exists(&state.pool, claims.sub, &claims.email).await?;
    let entry = ProgressEntry::create(&state.pool, claims.sub, &req).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[axum::debug_handler]
pub async fn delete_entry(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = ProgressEntry::delete_owned(&state.pool, claims.sub, id).await?;
    if !deleted {
        return Err(AppError::not_found("Progress entry not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ProgressSummary {
    pub user: SummaryUser,
    pub current: CurrentMetrics,
    pub trends: Trends,
    pub workouts: WorkoutTotals,
    pub recent_activity: Vec<RecentActivity>,
    pub consistency_score: f64,
    pub improvement_score: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CurrentMetrics {
    pub recorded_at: Option<DateTime<Utc>>,
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub chest_cm: Option<f64>,
    pub waist_cm: Option<f64>,
    pub hips_cm: Option<f64>,
    pub arms_cm: Option<f64>,
    pub thighs_cm: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Trends {
    pub weight_30d: f64,
    pub weight_7d: f64,
    pub body_fat_30d: f64,
    pub body_fat_7d: f64,
}

#[derive(Debug, Serialize)]
pub struct WorkoutTotals {
    pub total_sessions: i64,
    pub sessions_last_30_days: i64,
    pub sessions_last_7_days: i64,
    pub total_sets: i64,
    pub completed_sets: i64,
    /// completed/total as a rounded percentage.
    pub completion_rate: i32,
    pub average_duration_minutes: i64,
    pub total_weight_lifted: f64,
    pub total_reps: i64,
}

#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub id: Uuid,
    pub workout_name: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: i32,
    pub total_sets: usize,
    pub completed_sets: usize,
}

/// The one endpoint with real computation: fan out the reads, walk the sets,
/// derive trends and scores. Read-only and deterministic for a fixed
/// database state; sparse history produces zeroed fields, not errors.
#[axum::debug_handler]
pub async fn get_summary(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let pool = &state.pool;

    let (user, entries, total_sessions, sessions_30d, sessions_7d, recent_sessions) =
        tokio::try_join!(
            User::find_by_id(pool, claims.sub),
            ProgressEntry::recent(pool, claims.sub, PROGRESS_ENTRY_WINDOW),
            WorkoutSession::count_all(pool, claims.sub),
            WorkoutSession::count_since(pool, claims.sub, now - Duration::days(30)),
            WorkoutSession::count_since(pool, claims.sub, now - Duration::days(7)),
            WorkoutSession::fetch_recent_with_details(pool, claims.sub, RECENT_SESSION_WINDOW),
        )?;

    let user = user.ok_or(AppError::Unauthorized)?;

    let weight_series: Vec<(DateTime<Utc>, Option<f64>)> = entries
        .iter()
        .map(|e| (e.recorded_at, e.weight_kg))
        .collect();
    let body_fat_series: Vec<(DateTime<Utc>, Option<f64>)> = entries
        .iter()
        .map(|e| (e.recorded_at, e.body_fat_pct))
        .collect();

    let trends = Trends {
        weight_30d: stats::window_trend(&weight_series, now, TREND_WINDOW_LONG_DAYS),
        weight_7d: stats::window_trend(&weight_series, now, TREND_WINDOW_SHORT_DAYS),
        body_fat_30d: stats::window_trend(&body_fat_series, now, TREND_WINDOW_LONG_DAYS),
        body_fat_7d: stats::window_trend(&body_fat_series, now, TREND_WINDOW_SHORT_DAYS),
    };

    let totals = stats::walk_sets(&recent_sessions);
    let strength = stats::strength_progress(&stats::session_weight_totals(&recent_sessions));

    let consistency_score = stats::consistency_score(sessions_30d);
    let improvement_score = stats::improvement_score(trends.weight_30d, strength, sessions_30d);

    let current = entries
        .first()
        .map(|e| CurrentMetrics {
            recorded_at: Some(e.recorded_at),
            weight_kg: e.weight_kg,
            body_fat_pct: e.body_fat_pct,
            chest_cm: e.chest_cm,
            waist_cm: e.waist_cm,
            hips_cm: e.hips_cm,
            arms_cm: e.arms_cm,
            thighs_cm: e.thighs_cm,
        })
        .unwrap_or_default();

    let recent_activity = recent_sessions.iter().map(activity_row).collect();

    let summary = ProgressSummary {
        user: SummaryUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        current,
        trends,
        workouts: WorkoutTotals {
            total_sessions,
            sessions_last_30_days: sessions_30d,
            sessions_last_7_days: sessions_7d,
            total_sets: totals.total_sets,
            completed_sets: totals.completed_sets,
            completion_rate: stats::completion_rate(totals.completed_sets, totals.total_sets),
            average_duration_minutes: stats::average_duration_minutes(
                totals.total_duration_secs,
                recent_sessions.len(),
            ),
            total_weight_lifted: totals.total_weight_lifted,
            total_reps: totals.total_reps,
        },
        recent_activity,
        consistency_score,
        improvement_score,
    };

    Ok((StatusCode::OK, Json(summary)))
}

fn activity_row(detail: &SessionDetail) -> RecentActivity {
    let sets: Vec<_> = detail
        .exercises
        .iter()
        .flat_map(|e| &e.sets)
        .collect();

    RecentActivity {
        id: detail.session.id,
        workout_name: detail.session.workout_name.clone(),
        started_at: detail.session.started_at,
        duration_secs: detail.session.duration_secs,
        total_sets: sets.len(),
        completed_sets: sets.iter().filter(|s| s.completed).count(),
    }
}
