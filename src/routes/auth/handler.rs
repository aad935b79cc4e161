use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppError,
    utils::{Claims, generate_token, hash_password, verify_password},
};

use super::model::{AuthResponse, LoginRequest, RegisterRequest};
use crate::routes::users::{User, UserInfo};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !req.email.contains('@') || req.email.len() > 254 {
        return Err(AppError::validation("Invalid email address"));
    }
    if req.password.len() < 8 {
        return Err(AppError::validation(
            "Password must be at least 8 characters",
        ));
    }
    if req.name.trim().is_empty() || req.name.len() > 80 {
        return Err(AppError::validation("Name must be 1-80 characters"));
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| AppError::internal(format!("bcrypt: {}", e)))?;

    let user = match User::create(&state.pool, &req.email, req.name.trim(), Some(&password_hash))
        .await
    {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::validation("Email is already registered"));
        }
        Err(e) => return Err(e.into()),
    };

    let (token, expires_at) = generate_token(user.id, &user.email, &state.config)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo::from(user),
            token,
            expires_at,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Accounts created through OAuth sign-in have no local credential.
    let hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;

    let valid = verify_password(&req.password, hash)
        .map_err(|e| AppError::internal(format!("bcrypt: {}", e)))?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    let (token, expires_at) = generate_token(user.id, &user.email, &state.config)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            user: UserInfo::from(user),
            token,
            expires_at,
        }),
    ))
}

#[axum::debug_handler]
pub async fn me(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::ensure_exists(&state.pool, claims.sub, &claims.email).await?;
    Ok((StatusCode::OK, Json(UserInfo::from(user))))
}
