use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::routes::exercises::Exercise;

/// Statement timeout for the session-save transaction. The nested per-set
/// insert loop can outlive the default on large sessions.
const SAVE_STATEMENT_TIMEOUT_MS: i64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: Uuid,
    /// NULL once the source workout is deleted; the denormalized name keeps
    /// the history readable.
    pub workout_id: Option<Uuid>,
    pub workout_name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionExercise {
    pub id: Uuid,
    pub session_id: Uuid,
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionSet {
    pub id: Uuid,
    pub session_exercise_id: Uuid,
    pub set_number: i32,
    pub target_reps: i32,
    pub target_weight: Option<f64>,
    pub actual_reps: Option<i32>,
    pub actual_weight: Option<f64>,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionExerciseDetail {
    #[serde(flatten)]
    pub exercise: SessionExercise,
    pub sets: Vec<SessionSet>,
}

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: WorkoutSession,
    pub exercises: Vec<SessionExerciseDetail>,
}

/// Required fields are `Option` so their absence surfaces as a 400 from the
/// handler instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct SaveSessionRequest {
    pub workout_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i32>,
    #[serde(default)]
    pub exercises: Vec<SessionExerciseInput>,
}

#[derive(Debug, Deserialize)]
pub struct SessionExerciseInput {
    pub exercise_id: Uuid,
    #[serde(default)]
    pub sets: Vec<SessionSetInput>,
}

#[derive(Debug, Deserialize)]
pub struct SessionSetInput {
    pub set_number: Option<i32>,
    pub target_reps: Option<i32>,
    pub target_weight: Option<f64>,
    pub actual_reps: Option<i32>,
    pub actual_weight: Option<f64>,
    pub completed: Option<bool>,
}

impl WorkoutSession {
    /// Persist a performed session as one atomic tree: header, per-exercise
    /// records, per-set records. Either everything commits or nothing does.
    pub async fn record(
        pool: &PgPool,
        user_id: Uuid,
        workout_id: Uuid,
        workout_name: &str,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        duration_secs: i32,
        exercises: &[(Exercise, &[SessionSetInput])],
    ) -> Result<Uuid, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(&format!(
            "SET LOCAL statement_timeout = {SAVE_STATEMENT_TIMEOUT_MS}"
        ))
        .execute(&mut *tx)
        .await?;

        let session_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO workout_sessions
                 (user_id, workout_id, workout_name, started_at, ended_at, duration_secs)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(user_id)
        .bind(workout_id)
        .bind(workout_name)
        .bind(started_at)
        .bind(ended_at)
        .bind(duration_secs)
        .fetch_one(&mut *tx)
        .await?;

        for (position, (exercise, sets)) in exercises.iter().enumerate() {
            let session_exercise_id = sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO session_exercises
                     (session_id, exercise_id, exercise_name, position)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id",
            )
            .bind(session_id)
            .bind(exercise.id)
            .bind(&exercise.name)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;

            for (index, set) in sets.iter().enumerate() {
                let target_reps = set.target_reps.unwrap_or(0);
                sqlx::query(
                    "INSERT INTO session_sets
                         (session_exercise_id, set_number, target_reps, target_weight,
                          actual_reps, actual_weight, completed)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(session_exercise_id)
                .bind(set.set_number.unwrap_or(index as i32 + 1))
                .bind(target_reps)
                .bind(set.target_weight)
                // Actuals default to the targets when the client omits them.
                .bind(set.actual_reps.unwrap_or(target_reps))
                .bind(set.actual_weight.or(set.target_weight))
                .bind(set.completed.unwrap_or(false))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(session_id)
    }

    /// The N most recent sessions with their nested exercises and sets,
    /// merged in memory from three scoped queries.
    pub async fn fetch_recent_with_details(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SessionDetail>, sqlx::Error> {
        let sessions = sqlx::query_as::<_, WorkoutSession>(
            "SELECT id, user_id, workout_id, workout_name, started_at, ended_at,
                    duration_secs, created_at
             FROM workout_sessions
             WHERE user_id = $1
             ORDER BY started_at DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(Self::attach_details(pool, sessions).await?)
    }

    pub async fn fetch_one_with_details(
        pool: &PgPool,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<SessionDetail>, sqlx::Error> {
        let sessions = sqlx::query_as::<_, WorkoutSession>(
            "SELECT id, user_id, workout_id, workout_name, started_at, ended_at,
                    duration_secs, created_at
             FROM workout_sessions
             WHERE id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(Self::attach_details(pool, sessions).await?.pop())
    }

    async fn attach_details(
        pool: &PgPool,
        sessions: Vec<WorkoutSession>,
    ) -> Result<Vec<SessionDetail>, sqlx::Error> {
        if sessions.is_empty() {
            return Ok(Vec::new());
        }

        let session_ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();

        let exercises = sqlx::query_as::<_, SessionExercise>(
            "SELECT id, session_id, exercise_id, exercise_name, position
             FROM session_exercises
             WHERE session_id = ANY($1)
             ORDER BY position",
        )
        .bind(&session_ids)
        .fetch_all(pool)
        .await?;

        let exercise_ids: Vec<Uuid> = exercises.iter().map(|e| e.id).collect();

        let sets = sqlx::query_as::<_, SessionSet>(
            "SELECT id, session_exercise_id, set_number, target_reps, target_weight,
                    actual_reps, actual_weight, completed
             FROM session_sets
             WHERE session_exercise_id = ANY($1)
             ORDER BY set_number",
        )
        .bind(&exercise_ids)
        .fetch_all(pool)
        .await?;

        let details = sessions
            .into_iter()
            .map(|session| {
                let exercises = exercises
                    .iter()
                    .filter(|e| e.session_id == session.id)
                    .map(|exercise| SessionExerciseDetail {
                        sets: sets
                            .iter()
                            .filter(|s| s.session_exercise_id == exercise.id)
                            .cloned()
                            .collect(),
                        exercise: exercise.clone(),
                    })
                    .collect();

                SessionDetail { session, exercises }
            })
            .collect();

        Ok(details)
    }

    pub async fn count_all(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM workout_sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn count_since(
        pool: &PgPool,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM workout_sessions WHERE user_id = $1 AND started_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }
}
