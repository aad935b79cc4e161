use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{AppState, error::AppError, utils::verify_token};

/// Name of the session cookie the frontend stores the token under.
pub const SESSION_COOKIE: &str = "session_token";

/// Authenticates the request and injects [`crate::utils::Claims`] as an
/// extension. The token is read from the session cookie, falling back to a
/// bearer `Authorization` header for non-browser callers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .or(bearer)
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(&token, &state.config).map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
