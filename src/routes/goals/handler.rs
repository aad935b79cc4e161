use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{AppState, error::AppError, utils::Claims};

use super::model::{FitnessGoal, UpdateGoalsRequest, validate_goals};

#[axum::debug_handler]
pub async fn get_goals(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let goals = FitnessGoal::list(&state.pool, claims.sub).await?;
    Ok((StatusCode::OK, Json(goals)))
}

#[axum::debug_handler]
pub async fn update_goals(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<UpdateGoalsRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_goals(&req.goals)?;

    let mut tx = state.pool.begin().await?;
    FitnessGoal::replace_all(&mut tx, claims.sub, &req.goals).await?;
    tx.commit().await?;

    let goals = FitnessGoal::list(&state.pool, claims.sub).await?;
    Ok((StatusCode::OK, Json(goals)))
}
