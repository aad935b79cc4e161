use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Columns fetched whenever a full user row is needed.
pub const USER_COLUMNS: &str = "id, email, name, password_hash, height_cm, weight_kg, bio, \
     onboarded, role, spotify_access_token, spotify_refresh_token, \
     spotify_token_expires_at, created_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bio: Option<String>,
    pub onboarded: bool,
    pub role: String,
    #[serde(skip_serializing)]
    pub spotify_access_token: Option<String>,
    #[serde(skip_serializing)]
    pub spotify_refresh_token: Option<String>,
    #[serde(skip_serializing)]
    pub spotify_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user, safe to hand to any authenticated caller.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bio: Option<String>,
    pub onboarded: bool,
    pub role: String,
    pub spotify_connected: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            height_cm: user.height_cm,
            weight_kg: user.weight_kg,
            bio: user.bio,
            onboarded: user.onboarded,
            role: user.role,
            spotify_connected: user.spotify_refresh_token.is_some(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goals: Vec<String>,
}

impl User {
    pub async fn create(
        pool: &PgPool,
        email: &str,
        name: &str,
        password_hash: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Fetch the caller's row, creating a bare one from the session claims on
    /// first contact. Covers OAuth sign-ins that never went through register.
    pub async fn ensure_exists(
        pool: &PgPool,
        id: Uuid,
        email: &str,
    ) -> Result<Self, sqlx::Error> {
        if let Some(user) = Self::find_by_id(pool, id).await? {
            return Ok(user);
        }

        tracing::info!(user_id = %id, "Creating user row on first authenticated request");

        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, name)
             VALUES ($1, $2, split_part($2, '@', 1))
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(email)
        .fetch_one(pool)
        .await
    }

    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE($1, name),
                 height_cm = COALESCE($2, height_cm),
                 weight_kg = COALESCE($3, weight_kg),
                 bio = COALESCE($4, bio)
             WHERE id = $5
             RETURNING {USER_COLUMNS}"
        ))
        .bind(req.name.as_deref())
        .bind(req.height_cm)
        .bind(req.weight_kg)
        .bind(req.bio.as_deref())
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn role_of(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
