//! Spotify Web API client.
//!
//! Handles:
//! - Authorization-code flow (authorize URL, code exchange)
//! - Token refresh against the stored refresh token
//! - Read-only catalog calls (profile, playlists, playback)
//! - Playlist creation, track adds, and transport controls

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Scopes requested on connect. Covers the panel's reads plus playlist
/// writes and transport controls.
const SCOPES: &str = "user-read-private user-read-email playlist-read-private \
                      playlist-modify-private playlist-modify-public \
                      user-read-playback-state user-modify-playback-state";

#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    accounts_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl SpotifyClient {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            accounts_url: "https://accounts.spotify.com".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Build the user-facing authorization URL for the connect redirect.
    pub fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/authorize", self.accounts_url),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::internal(format!("Failed to build authorize URL: {}", e)))?;

        Ok(url.to_string())
    }

    /// Exchange an authorization code for the initial token triple.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Spotify(format!("Token exchange request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Spotify(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Get the connected account's profile.
    pub async fn get_profile(&self, access_token: &str) -> Result<SpotifyProfile, AppError> {
        self.get_json(&format!("{}/me", self.api_url), access_token)
            .await
    }

    /// List the connected account's playlists.
    pub async fn get_playlists(&self, access_token: &str) -> Result<PlaylistPage, AppError> {
        self.get_json(&format!("{}/me/playlists?limit=50", self.api_url), access_token)
            .await
    }

    /// Current playback state. `None` when nothing is playing (204).
    pub async fn get_playback(
        &self,
        access_token: &str,
    ) -> Result<Option<serde_json::Value>, AppError> {
        let response = self
            .http
            .get(format!("{}/me/player", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Spotify(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        self.check_response_json(response).await.map(Some)
    }

    /// Create a playlist on the connected account.
    pub async fn create_playlist(
        &self,
        access_token: &str,
        spotify_user_id: &str,
        name: &str,
        description: Option<&str>,
        public: bool,
    ) -> Result<Playlist, AppError> {
        let body = serde_json::json!({
            "name": name,
            "description": description.unwrap_or(""),
            "public": public,
        });

        let response = self
            .http
            .post(format!("{}/users/{}/playlists", self.api_url, spotify_user_id))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Spotify(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Append track URIs to a playlist. Returns the new snapshot id.
    pub async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<String, AppError> {
        let body = serde_json::json!({ "uris": uris });

        let response = self
            .http
            .post(format!("{}/playlists/{}/tracks", self.api_url, playlist_id))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Spotify(e.to_string()))?;

        let snapshot: SnapshotResponse = self.check_response_json(response).await?;
        Ok(snapshot.snapshot_id)
    }

    /// Transport controls: resume, pause, next, previous.
    pub async fn transport(&self, access_token: &str, action: TransportAction) -> Result<(), AppError> {
        let (method, path) = match action {
            TransportAction::Play => (reqwest::Method::PUT, "me/player/play"),
            TransportAction::Pause => (reqwest::Method::PUT, "me/player/pause"),
            TransportAction::Next => (reqwest::Method::POST, "me/player/next"),
            TransportAction::Previous => (reqwest::Method::POST, "me/player/previous"),
        };

        let response = self
            .http
            .request(method, format!("{}/{}", self.api_url, path))
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| AppError::Spotify(e.to_string()))?;

        self.check_response(response).await
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Spotify(e.to_string()))?;

        self.check_response_json(response).await
    }

    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Spotify(format!("HTTP {}: {}", status, body)))
    }

    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Spotify(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Spotify(format!("JSON parse error: {}", e)))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TransportAction {
    Play,
    Pause,
    Next,
    Previous,
}

impl TransportAction {
    pub fn from_path(action: &str) -> Option<Self> {
        match action {
            "play" => Some(Self::Play),
            "pause" => Some(Self::Pause),
            "next" => Some(Self::Next),
            "previous" => Some(Self::Previous),
            _ => None,
        }
    }
}

/// Token response from the accounts service. `refresh_token` is absent on
/// refresh grants unless Spotify rotates it.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct SpotifyProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct PlaylistPage {
    pub items: Vec<Playlist>,
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub public: Option<bool>,
    pub tracks: Option<PlaylistTracksRef>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct PlaylistTracksRef {
    pub total: i64,
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    snapshot_id: String,
}

#[derive(Debug, sqlx::FromRow)]
struct StoredTokens {
    spotify_access_token: Option<String>,
    spotify_refresh_token: Option<String>,
    spotify_token_expires_at: Option<DateTime<Utc>>,
}

/// Persist a token triple on the user row. Used by the OAuth callback and by
/// the refresh path below.
pub async fn store_tokens(
    pool: &PgPool,
    user_id: Uuid,
    access_token: &str,
    refresh_token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users
         SET spotify_access_token = $1, spotify_refresh_token = $2, spotify_token_expires_at = $3
         WHERE id = $4",
    )
    .bind(access_token)
    .bind(refresh_token)
    .bind(expires_at)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Clear the stored triple on disconnect.
pub async fn clear_tokens(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users
         SET spotify_access_token = NULL, spotify_refresh_token = NULL,
             spotify_token_expires_at = NULL
         WHERE id = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a valid (non-expired) access token for the given user, refreshing
/// inline with the stored refresh token when the expiry is within the margin.
/// Refreshed triples are written back before the token is returned.
pub async fn get_valid_access_token(
    pool: &PgPool,
    client: &SpotifyClient,
    user_id: Uuid,
) -> Result<String, AppError> {
    let tokens = sqlx::query_as::<_, StoredTokens>(
        "SELECT spotify_access_token, spotify_refresh_token, spotify_token_expires_at
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    let (access_token, refresh_token, expires_at) = match (
        tokens.spotify_access_token,
        tokens.spotify_refresh_token,
        tokens.spotify_token_expires_at,
    ) {
        (Some(a), Some(r), Some(e)) => (a, r, e),
        _ => return Err(AppError::validation("Spotify account is not connected")),
    };

    let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
    if Utc::now() + margin < expires_at {
        return Ok(access_token);
    }

    tracing::info!(%user_id, "Spotify access token expired, refreshing");

    let refreshed = client.refresh_token(&refresh_token).await?;
    let new_expires_at = Utc::now() + Duration::seconds(refreshed.expires_in);
    // Spotify only returns a new refresh token when it rotates; keep the old
    // one otherwise.
    let new_refresh = refreshed.refresh_token.unwrap_or(refresh_token);

    store_tokens(
        pool,
        user_id,
        &refreshed.access_token,
        &new_refresh,
        new_expires_at,
    )
    .await?;

    Ok(refreshed.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SpotifyClient {
        SpotifyClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "http://localhost:3000/api/spotify/callback".to_string(),
        )
    }

    #[test]
    fn authorize_url_carries_required_params() {
        let url = client().authorize_url("state-token").unwrap();
        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=state-token"));
        assert!(url.contains("redirect_uri="));
    }

    #[test]
    fn transport_action_parsing() {
        assert!(matches!(
            TransportAction::from_path("play"),
            Some(TransportAction::Play)
        ));
        assert!(matches!(
            TransportAction::from_path("previous"),
            Some(TransportAction::Previous)
        ));
        assert!(TransportAction::from_path("rewind").is_none());
    }
}
