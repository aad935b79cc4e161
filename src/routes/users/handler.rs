use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{AppState, error::AppError, utils::Claims};

use super::model::{OnboardingRequest, UpdateProfileRequest, User, UserInfo};
use crate::routes::goals::{FitnessGoal, validate_goals};

#[axum::debug_handler]
pub async fn update_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(name) = &req.name {
        if name.trim().is_empty() || name.len() > 80 {
            return Err(AppError::validation("Name must be 1-80 characters"));
        }
    }
    if matches!(req.height_cm, Some(h) if h <= 0.0)
        || matches!(req.weight_kg, Some(w) if w <= 0.0)
    {
        return Err(AppError::validation("Height and weight must be positive"));
    }

    User::ensure_exists(&state.pool, claims.sub, &claims.email).await?;
    let user = User::update_profile(&state.pool, claims.sub, &req).await?;

    Ok((StatusCode::OK, Json(UserInfo::from(user))))
}

#[axum::debug_handler]
pub async fn complete_onboarding(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<OnboardingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if matches!(req.height_cm, Some(h) if h <= 0.0)
        || matches!(req.weight_kg, Some(w) if w <= 0.0)
    {
        return Err(AppError::validation("Height and weight must be positive"));
    }
    validate_goals(&req.goals)?;

    User::ensure_exists(&state.pool, claims.sub, &claims.email).await?;

    let mut tx = state.pool.begin().await?;

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET height_cm = COALESCE($1, height_cm),
             weight_kg = COALESCE($2, weight_kg),
             onboarded = TRUE
         WHERE id = $3
         RETURNING {}",
        super::model::USER_COLUMNS
    ))
    .bind(req.height_cm)
    .bind(req.weight_kg)
    .bind(claims.sub)
    .fetch_one(&mut *tx)
    .await?;

    FitnessGoal::replace_all(&mut tx, claims.sub, &req.goals).await?;

    tx.commit().await?;

    Ok((StatusCode::OK, Json(UserInfo::from(user))))
}
