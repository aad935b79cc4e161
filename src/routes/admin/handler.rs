use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{AppState, error::AppError, utils::Claims};

use super::model::{
    AdminListQuery, AdminSetupRequest, AdminUpdateRequest, fetch_user_page,
};
use crate::routes::progress::ProgressEntry;
use crate::routes::sessions::WorkoutSession;
use crate::routes::users::{USER_COLUMNS, User, UserInfo};
use crate::routes::workouts::Workout;

const ROLES: &[&str] = &["user", "admin"];

/// Role gate, consulted against the database on every admin request.
async fn require_admin(state: &AppState, claims: &Claims) -> Result<(), AppError> {
    match User::role_of(&state.pool, claims.sub).await? {
        Some(role) if role == "admin" => Ok(()),
        Some(_) => Err(AppError::forbidden("Administrator access required")),
        None => Err(AppError::Unauthorized),
    }
}

#[axum::debug_handler]
pub async fn list_users(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &claims).await?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());

    let page = fetch_user_page(&state.pool, search, limit, offset).await?;
    Ok((StatusCode::OK, Json(page)))
}

#[derive(Debug, Serialize)]
pub struct AdminUserDetail {
    pub user: UserInfo,
    pub recent_workouts: Vec<Workout>,
    pub recent_sessions: Vec<WorkoutSession>,
    pub recent_progress: Vec<ProgressEntry>,
}

#[axum::debug_handler]
pub async fn get_user_detail(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &claims).await?;

    let user = User::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let recent_workouts = sqlx::query_as::<_, Workout>(
        "SELECT id, user_id, name, description, is_public, created_at
         FROM workouts WHERE user_id = $1
         ORDER BY created_at DESC LIMIT 5",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    let recent_sessions = sqlx::query_as::<_, WorkoutSession>(
        "SELECT id, user_id, workout_id, workout_name, started_at, ended_at,
                duration_secs, created_at
         FROM workout_sessions WHERE user_id = $1
         ORDER BY started_at DESC LIMIT 5",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    let recent_progress = ProgressEntry::recent(&state.pool, id, 5).await?;

    Ok((
        StatusCode::OK,
        Json(AdminUserDetail {
            user: UserInfo::from(user),
            recent_workouts,
            recent_sessions,
            recent_progress,
        }),
    ))
}

#[axum::debug_handler]
pub async fn update_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &claims).await?;

    if let Some(role) = &req.role {
        if !ROLES.contains(&role.as_str()) {
            return Err(AppError::Validation(format!(
                "Role must be one of: {}",
                ROLES.join(", ")
            )));
        }
    }
    if let Some(name) = &req.name {
        if name.trim().is_empty() || name.len() > 80 {
            return Err(AppError::validation("Name must be 1-80 characters"));
        }
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET name = COALESCE($1, name),
             role = COALESCE($2, role),
             onboarded = COALESCE($3, onboarded)
         WHERE id = $4
         RETURNING {USER_COLUMNS}"
    ))
    .bind(req.name.as_deref().map(str::trim))
    .bind(req.role.as_deref())
    .bind(req.onboarded)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok((StatusCode::OK, Json(UserInfo::from(user))))
}

#[axum::debug_handler]
pub async fn delete_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &claims).await?;

    if id == claims.sub {
        return Err(AppError::validation(
            "Admins cannot delete their own account",
        ));
    }

    // Owned workouts, sessions, progress and goals go with the FK cascades.
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("User not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Bootstrap endpoint: promotes the caller to admin when the request carries
/// the configured setup secret. Disabled entirely when no secret is set.
#[axum::debug_handler]
pub async fn admin_setup(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<AdminSetupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let expected = state
        .config
        .admin_setup_secret
        .as_deref()
        .ok_or_else(|| AppError::not_found("Admin setup is not enabled"))?;

    // Compare digests so the lengths never short-circuit the comparison.
    let provided = Sha256::digest(req.secret.as_bytes());
    let wanted = Sha256::digest(expected.as_bytes());
    if provided != wanted {
        return Err(AppError::forbidden("Invalid setup secret"));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = 'admin' WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(claims.sub)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    tracing::info!(user_id = %user.id, "User promoted to admin via setup secret");

    Ok((StatusCode::OK, Json(UserInfo::from(user))))
}
