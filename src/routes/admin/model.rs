use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// One row of the admin user list: profile fields plus denormalized activity
/// counters computed per request.
#[derive(Debug, Serialize, FromRow)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub workout_count: i64,
    pub session_count: i64,
    pub progress_count: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminUserPage {
    pub users: Vec<AdminUserRow>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdateRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub onboarded: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AdminSetupRequest {
    pub secret: String,
}

const LIST_COLUMNS: &str = "u.id, u.email, u.name, u.role, u.onboarded, u.created_at, \
     (SELECT COUNT(*) FROM workouts w WHERE w.user_id = u.id) AS workout_count, \
     (SELECT COUNT(*) FROM workout_sessions s WHERE s.user_id = u.id) AS session_count, \
     (SELECT COUNT(*) FROM progress_entries p WHERE p.user_id = u.id) AS progress_count";

pub async fn fetch_user_page(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<AdminUserPage, sqlx::Error> {
    let users = sqlx::query_as::<_, AdminUserRow>(&format!(
        "SELECT {LIST_COLUMNS}
         FROM users u
         WHERE ($1::text IS NULL OR u.email ILIKE '%' || $1 || '%'
                OR u.name ILIKE '%' || $1 || '%')
         ORDER BY u.created_at DESC
         LIMIT $2 OFFSET $3"
    ))
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users u
         WHERE ($1::text IS NULL OR u.email ILIKE '%' || $1 || '%'
                OR u.name ILIKE '%' || $1 || '%')",
    )
    .bind(search)
    .fetch_one(pool)
    .await?;

    Ok(AdminUserPage {
        users,
        total,
        limit,
        offset,
    })
}
