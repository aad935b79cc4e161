use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgressEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub chest_cm: Option<f64>,
    pub waist_cm: Option<f64>,
    pub hips_cm: Option<f64>,
    pub arms_cm: Option<f64>,
    pub thighs_cm: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProgressRequest {
    pub recorded_at: Option<DateTime<Utc>>,
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub chest_cm: Option<f64>,
    pub waist_cm: Option<f64>,
    pub hips_cm: Option<f64>,
    pub arms_cm: Option<f64>,
    pub thighs_cm: Option<f64>,
    pub notes: Option<String>,
}

impl CreateProgressRequest {
    pub fn has_any_metric(&self) -> bool {
        self.weight_kg.is_some()
            || self.body_fat_pct.is_some()
            || self.chest_cm.is_some()
            || self.waist_cm.is_some()
            || self.hips_cm.is_some()
            || self.arms_cm.is_some()
            || self.thighs_cm.is_some()
            || self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

const ENTRY_COLUMNS: &str = "id, user_id, recorded_at, weight_kg, body_fat_pct, chest_cm, \
     waist_cm, hips_cm, arms_cm, thighs_cm, notes, created_at";

impl ProgressEntry {
    /// Newest first. The most recent entry is treated as "current".
    pub async fn recent(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProgressEntry>(&format!(
            "SELECT {ENTRY_COLUMNS}
             FROM progress_entries
             WHERE user_id = $1
             ORDER BY recorded_at DESC
             LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: &CreateProgressRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProgressEntry>(&format!(
            "INSERT INTO progress_entries
                 (user_id, recorded_at, weight_kg, body_fat_pct, chest_cm, waist_cm,
                  hips_cm, arms_cm, thighs_cm, notes)
             VALUES ($1, COALESCE($2, NOW()), $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(user_id)
        .bind(req.recorded_at)
        .bind(req.weight_kg)
        .bind(req.body_fat_pct)
        .bind(req.chest_cm)
        .bind(req.waist_cm)
        .bind(req.hips_cm)
        .bind(req.arms_cm)
        .bind(req.thighs_cm)
        .bind(req.notes.as_deref())
        .fetch_one(pool)
        .await
    }

    /// Ownership-scoped delete; returns whether a row went away.
    pub async fn delete_owned(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM progress_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
