use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};

use crate::{
    AppState,
    error::AppError,
    services::spotify::{self, TransportAction},
    utils::{Claims, generate_oauth_state, verify_oauth_state},
};

use super::model::{
    AddTracksRequest, AddTracksResponse, CallbackQuery, ConnectResponse, CreatePlaylistRequest,
    StatusResponse,
};
use crate::routes::users::User;

/// Start the authorization-code flow: hand the client the authorize URL with
/// a signed state bound to the current user.
#[axum::debug_handler]
pub async fn connect(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let oauth_state = generate_oauth_state(claims.sub, &state.config)
        .map_err(|e| AppError::internal(format!("Failed to sign OAuth state: {}", e)))?;

    let url = state.spotify.authorize_url(&oauth_state)?;
    Ok((StatusCode::OK, Json(ConnectResponse { url })))
}

/// OAuth redirect target. Public route: the caller is identified by the
/// signed state, not by a session.
#[axum::debug_handler]
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(error) = query.error {
        return Err(AppError::Validation(format!(
            "Authorization was denied: {}",
            error
        )));
    }

    let code = query
        .code
        .ok_or_else(|| AppError::validation("Missing authorization code"))?;
    let oauth_state = query
        .state
        .ok_or_else(|| AppError::validation("Missing state parameter"))?;

    let user_id =
        verify_oauth_state(&oauth_state, &state.config).map_err(|_| AppError::Unauthorized)?;

    let tokens = state.spotify.exchange_code(&code).await?;
    let refresh_token = tokens
        .refresh_token
        .ok_or_else(|| AppError::internal("Token exchange returned no refresh token"))?;
    let expires_at = Utc::now() + Duration::seconds(tokens.expires_in);

    spotify::store_tokens(
        &state.pool,
        user_id,
        &tokens.access_token,
        &refresh_token,
        expires_at,
    )
    .await?;

    tracing::info!(%user_id, "Spotify account connected");

    Ok((
        StatusCode::OK,
        Json(StatusResponse {
            connected: true,
            expires_at: Some(expires_at),
        }),
    ))
}

#[axum::debug_handler]
pub async fn status(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok((
        StatusCode::OK,
        Json(StatusResponse {
            connected: user.spotify_refresh_token.is_some(),
            expires_at: user.spotify_token_expires_at,
        }),
    ))
}

#[axum::debug_handler]
pub async fn disconnect(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    spotify::clear_tokens(&state.pool, claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn get_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let token = spotify::get_valid_access_token(&state.pool, &state.spotify, claims.sub).await?;
    let profile = state.spotify.get_profile(&token).await?;
    Ok((StatusCode::OK, Json(profile)))
}

#[axum::debug_handler]
pub async fn get_playlists(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let token = spotify::get_valid_access_token(&state.pool, &state.spotify, claims.sub).await?;
    let playlists = state.spotify.get_playlists(&token).await?;
    Ok((StatusCode::OK, Json(playlists)))
}

#[axum::debug_handler]
pub async fn get_playback(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let token = spotify::get_valid_access_token(&state.pool, &state.spotify, claims.sub).await?;
    let playback = state.spotify.get_playback(&token).await?;
    Ok((StatusCode::OK, Json(playback)))
}

#[axum::debug_handler]
pub async fn create_playlist(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreatePlaylistRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.name.trim().is_empty() || req.name.len() > 100 {
        return Err(AppError::validation("Playlist name must be 1-100 characters"));
    }

    let token = spotify::get_valid_access_token(&state.pool, &state.spotify, claims.sub).await?;

    // The create endpoint is addressed by Spotify user id, not by session.
    let profile = state.spotify.get_profile(&token).await?;
    let playlist = state
        .spotify
        .create_playlist(
            &token,
            &profile.id,
            req.name.trim(),
            req.description.as_deref(),
            req.public,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(playlist)))
}

#[axum::debug_handler]
pub async fn add_tracks(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Json(req): Json<AddTracksRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.uris.is_empty() || req.uris.len() > 100 {
        return Err(AppError::validation("Provide 1-100 track URIs"));
    }

    let token = spotify::get_valid_access_token(&state.pool, &state.spotify, claims.sub).await?;
    let snapshot_id = state
        .spotify
        .add_tracks(&token, &playlist_id, &req.uris)
        .await?;

    Ok((StatusCode::OK, Json(AddTracksResponse { snapshot_id })))
}

#[axum::debug_handler]
pub async fn transport_control(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let action = TransportAction::from_path(&action)
        .ok_or_else(|| AppError::validation("Unknown player action"))?;

    let token = spotify::get_valid_access_token(&state.pool, &state.spotify, claims.sub).await?;
    state.spotify.transport(&token, action).await?;

    Ok(StatusCode::NO_CONTENT)
}
