use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

pub const DIFFICULTIES: &[&str] = &["beginner", "intermediate", "advanced"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub muscle_group: String,
    pub difficulty: String,
    pub instructions: Option<String>,
    /// NULL for system-seeded catalog rows.
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    pub muscle_group: String,
    pub difficulty: String,
    pub instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseFilter {
    pub muscle_group: Option<String>,
    pub difficulty: Option<String>,
    pub search: Option<String>,
}

impl Exercise {
    pub async fn list(pool: &PgPool, filter: &ExerciseFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            "SELECT id, name, muscle_group, difficulty, instructions, created_by, created_at
             FROM exercises
             WHERE ($1::text IS NULL OR muscle_group = $1)
               AND ($2::text IS NULL OR difficulty = $2)
               AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%')
             ORDER BY name",
        )
        .bind(filter.muscle_group.as_deref())
        .bind(filter.difficulty.as_deref())
        .bind(filter.search.as_deref())
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            "SELECT id, name, muscle_group, difficulty, instructions, created_by, created_at
             FROM exercises
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Resolve a batch of catalog ids. Missing ids are simply absent from the
    /// result; callers decide whether that is an error.
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            "SELECT id, name, muscle_group, difficulty, instructions, created_by, created_at
             FROM exercises
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        req: &CreateExerciseRequest,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            "INSERT INTO exercises (name, muscle_group, difficulty, instructions, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, muscle_group, difficulty, instructions, created_by, created_at",
        )
        .bind(req.name.trim())
        .bind(req.muscle_group.trim())
        .bind(&req.difficulty)
        .bind(req.instructions.as_deref())
        .bind(created_by)
        .fetch_one(pool)
        .await
    }
}
