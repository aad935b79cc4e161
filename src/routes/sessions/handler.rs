use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::AppError, utils::Claims};

use super::model::{SaveSessionRequest, SessionSetInput, WorkoutSession};
use crate::routes::exercises::Exercise;
use crate::routes::workouts::Workout;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SaveSessionResponse {
    pub id: Uuid,
}

#[axum::debug_handler]
pub async fn save_session(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<SaveSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let workout_id = req
        .workout_id
        .ok_or_else(|| AppError::validation("workout_id is required"))?;
    let started_at = req
        .started_at
        .ok_or_else(|| AppError::validation("started_at is required"))?;
    let ended_at = req
        .ended_at
        .ok_or_else(|| AppError::validation("ended_at is required"))?;
    let duration_secs = req
        .duration_secs
        .ok_or_else(|| AppError::validation("duration_secs is required"))?;

    if duration_secs < 0 {
        return Err(AppError::validation("duration_secs cannot be negative"));
    }
    if ended_at < started_at {
        return Err(AppError::validation("ended_at precedes started_at"));
    }

    let workout = Workout::find_by_id(&state.pool, workout_id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout not found"))?;

    // Best-effort exercise resolution: references that no longer resolve are
    // dropped so the rest of the session still saves.
    let ids: Vec<Uuid> = req.exercises.iter().map(|e| e.exercise_id).collect();
    let catalog = Exercise::find_by_ids(&state.pool, &ids).await?;

    let mut resolved: Vec<(Exercise, &[SessionSetInput])> = Vec::new();
    for input in &req.exercises {
        match catalog.iter().find(|e| e.id == input.exercise_id) {
            Some(exercise) => resolved.push((exercise.clone(), &input.sets)),
            None => {
                tracing::warn!(
                    exercise_id = %input.exercise_id,
                    user_id = %claims.sub,
                    "Dropping unresolvable exercise from session save"
                );
            }
        }
    }

    let id = WorkoutSession::record(
        &state.pool,
        claims.sub,
        workout.id,
        &workout.name,
        started_at,
        ended_at,
        duration_secs,
        &resolved,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(SaveSessionResponse { id })))
}

#[axum::debug_handler]
pub async fn list_sessions(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 50);
    let sessions =
        WorkoutSession::fetch_recent_with_details(&state.pool, claims.sub, limit).await?;

    Ok((StatusCode::OK, Json(sessions)))
}

#[axum::debug_handler]
pub async fn get_session(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = WorkoutSession::fetch_one_with_details(&state.pool, claims.sub, id)
        .await?
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    Ok((StatusCode::OK, Json(session)))
}
