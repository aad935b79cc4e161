use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{AppState, error::AppError, utils::Claims};

use super::model::{CreateExerciseRequest, DIFFICULTIES, Exercise, ExerciseFilter};

#[axum::debug_handler]
pub async fn list_exercises(
    State(state): State<AppState>,
    Query(filter): Query<ExerciseFilter>,
) -> Result<impl IntoResponse, AppError> {
    let exercises = Exercise::list(&state.pool, &filter).await?;
    Ok((StatusCode::OK, Json(exercises)))
}

#[axum::debug_handler]
pub async fn get_exercise(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let exercise = Exercise::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Exercise not found"))?;

    Ok((StatusCode::OK, Json(exercise)))
}

#[axum::debug_handler]
pub async fn create_exercise(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.name.trim().len() < 2 || req.name.len() > 120 {
        return Err(AppError::validation("Exercise name must be 2-120 characters"));
    }
    if req.muscle_group.trim().is_empty() {
        return Err(AppError::validation("Muscle group is required"));
    }
    if !DIFFICULTIES.contains(&req.difficulty.as_str()) {
        return Err(AppError::Validation(format!(
            "Difficulty must be one of: {}",
            DIFFICULTIES.join(", ")
        )));
    }

    let exercise = Exercise::create(&state.pool, &req, claims.sub).await?;

    Ok((StatusCode::CREATED, Json(exercise)))
}
