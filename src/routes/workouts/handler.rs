use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{AppState, error::AppError, utils::Claims};

use super::model::{CreateWorkoutRequest, Workout, WorkoutDetail, WorkoutExerciseInput};
use crate::routes::exercises::Exercise;
use crate::routes::users::User;

const MIN_EXERCISES: usize = 3;

fn validate_request(req: &CreateWorkoutRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() || req.name.len() > 120 {
        return Err(AppError::validation("Workout name must be 1-120 characters"));
    }
    if req.exercises.len() < MIN_EXERCISES {
        return Err(AppError::Validation(format!(
            "A workout needs at least {} exercises",
            MIN_EXERCISES
        )));
    }
    for exercise in &req.exercises {
        if exercise.sets <= 0 || exercise.reps <= 0 {
            return Err(AppError::validation("Sets and reps must be positive"));
        }
        if matches!(exercise.weight, Some(w) if w < 0.0) {
            return Err(AppError::validation("Weight cannot be negative"));
        }
    }
    Ok(())
}

/// All referenced catalog ids must resolve; workouts are prescriptions, not
/// best-effort records like sessions.
async fn check_exercises_exist(
    state: &AppState,
    exercises: &[WorkoutExerciseInput],
) -> Result<(), AppError> {
    let ids: Vec<Uuid> = exercises.iter().map(|e| e.exercise_id).collect();
    let found = Exercise::find_by_ids(&state.pool, &ids).await?;

    if let Some(missing) = ids.iter().find(|id| !found.iter().any(|e| e.id == **id)) {
        return Err(AppError::Validation(format!(
            "Unknown exercise: {}",
            missing
        )));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn list_workouts(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let workouts = Workout::list_visible(&state.pool, claims.sub).await?;
    Ok((StatusCode::OK, Json(workouts)))
}

#[axum::debug_handler]
pub async fn get_workout(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let workout = Workout::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout not found"))?;

    if workout.user_id != claims.sub && !workout.is_public {
        return Err(AppError::forbidden("This workout is private"));
    }

    let exercises = Workout::exercises_of(&state.pool, workout.id).await?;
    Ok((StatusCode::OK, Json(WorkoutDetail { workout, exercises })))
}

#[axum::debug_handler]
pub async fn create_workout(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateWorkoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&req)?;
    check_exercises_exist(&state, &req.exercises).await?;

    // First-time OAuth sign-ins may not have a local row yet.
    User::ensure_exists(&state.pool, claims.sub, &claims.email).await?;

    let mut tx = state.pool.begin().await?;
    let workout = Workout::insert(&mut tx, claims.sub, &req).await?;
    tx.commit().await?;

    let exercises = Workout::exercises_of(&state.pool, workout.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(WorkoutDetail { workout, exercises }),
    ))
}

#[axum::debug_handler]
pub async fn update_workout(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateWorkoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing = Workout::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout not found"))?;

    if existing.user_id != claims.sub {
        return Err(AppError::forbidden("Only the creator may edit a workout"));
    }

    validate_request(&req)?;
    check_exercises_exist(&state, &req.exercises).await?;

    let mut tx = state.pool.begin().await?;

    let workout = sqlx::query_as::<_, Workout>(
        "UPDATE workouts
         SET name = $1, description = $2, is_public = $3
         WHERE id = $4
         RETURNING id, user_id, name, description, is_public, created_at",
    )
    .bind(req.name.trim())
    .bind(req.description.as_deref())
    .bind(req.is_public)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    Workout::replace_exercise_list(&mut tx, id, &req.exercises).await?;

    tx.commit().await?;

    let exercises = Workout::exercises_of(&state.pool, id).await?;
    Ok((StatusCode::OK, Json(WorkoutDetail { workout, exercises })))
}

#[axum::debug_handler]
pub async fn delete_workout(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = Workout::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout not found"))?;

    if existing.user_id != claims.sub {
        return Err(AppError::forbidden("Only the creator may delete a workout"));
    }

    Workout::delete(&state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
